//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the UI, App, and Executor layers.

pub mod ui_events;
pub mod executor;
pub mod render;

pub use ui_events::UiEvent;
pub use executor::{ExecutorCommand, ExecutorOutput, ExecutorResponse};
pub use render::RenderState;
