//! # Ghostwire
//!
//! A terminal front end for the `httpcli` request and security-scan tool.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE
//! - Headers, body and auth (Bearer, Basic) editors
//! - Security scans (SQL injection, XSS, path traversal, SSRF, IDOR)
//! - Collections and request history, persisted as JSON
//! - Collection import (native or Postman v2.1) and export
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Executor Layer (Tokio child processes)

pub mod constants;
pub mod config;
pub mod error;
pub mod models;
pub mod args;
pub mod output;
pub mod storage;
pub mod postman;
pub mod transfer;
pub mod ui;
pub mod messages;
pub mod app;
pub mod executor;

// Re-export commonly used types
pub use config::Config;
pub use error::ImportError;
pub use models::{AuthType, Collection, Header, HttpMethod, Request, Response, ScanType};
pub use args::build_args;
pub use output::parse_verbose_output;
pub use storage::CollectionStore;
pub use messages::{ExecutorCommand, ExecutorResponse, RenderState, UiEvent};
pub use app::{AppActor, AppState};
pub use executor::ExecutorActor;
