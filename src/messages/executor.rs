//! Executor messages - communication between App and Executor layers

/// Commands sent from App layer to Executor layer
#[derive(Debug, Clone)]
pub enum ExecutorCommand {
    /// Run the executor with synthesized arguments
    Execute { id: u64, args: Vec<String> },
    /// Shutdown the executor actor
    Shutdown,
}

/// What the executor process produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutorOutput {
    pub stdout: String,
    pub stderr: String,
    /// Set when the command exited abnormally
    pub error: Option<String>,
}

/// Responses sent from Executor layer to App layer
#[derive(Debug, Clone)]
pub enum ExecutorResponse {
    /// The command ran to completion, successfully or not
    Finished { id: u64, output: ExecutorOutput },
    /// The command could not be dispatched at all
    DispatchFailed { id: u64, message: String },
}

impl ExecutorResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            ExecutorResponse::Finished { id, .. } => *id,
            ExecutorResponse::DispatchFailed { id, .. } => *id,
        }
    }
}
