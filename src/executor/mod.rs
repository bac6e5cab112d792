//! Executor layer - runs the external HTTP client as a child process
//!
//! The Executor actor receives execute commands and sends back the captured output.

pub mod actor;
pub mod process;

pub use actor::ExecutorActor;
