//! Executor actor - runs executor processes in the Tokio async runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::executor::process;
use crate::messages::{ExecutorCommand, ExecutorResponse};

/// Executor actor that turns execute commands into child processes
pub struct ExecutorActor {
    program: String,
    response_tx: mpsc::UnboundedSender<ExecutorResponse>,
    active: JoinSet<()>,
}

impl ExecutorActor {
    pub fn new(program: impl Into<String>, response_tx: mpsc::UnboundedSender<ExecutorResponse>) -> Self {
        ExecutorActor {
            program: program.into(),
            response_tx,
            active: JoinSet::new(),
        }
    }

    /// Run the executor actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<ExecutorCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(ExecutorCommand::Execute { id, args }) => {
                            let response_tx = self.response_tx.clone();
                            let program = self.program.clone();

                            self.active.spawn(async move {
                                tracing::info!(id, program = %program, "Running executor");
                                let response = match process::run(&program, &args).await {
                                    Ok(output) => {
                                        tracing::info!(id, failed = output.error.is_some(), "Executor finished");
                                        ExecutorResponse::Finished { id, output }
                                    }
                                    Err(e) => {
                                        tracing::error!(id, error = %e, "Executor could not be started");
                                        ExecutorResponse::DispatchFailed {
                                            id,
                                            message: format!("{:#}", e),
                                        }
                                    }
                                };
                                let _ = response_tx.send(response);
                            });
                        }

                        Some(ExecutorCommand::Shutdown) | None => {
                            // Aborted tasks drop their child handles, which kills the processes
                            self.active.abort_all();
                            break;
                        }
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active.join_next() => {}
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_execute_reports_back_with_id() {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (resp_tx, mut resp_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(ExecutorActor::new("echo", resp_tx).run(cmd_rx));

        cmd_tx
            .send(ExecutorCommand::Execute {
                id: 42,
                args: vec!["hello".to_string()],
            })
            .unwrap();

        match resp_rx.recv().await.unwrap() {
            ExecutorResponse::Finished { id, output } => {
                assert_eq!(id, 42);
                assert_eq!(output.stdout, "hello\n");
            }
            other => panic!("unexpected response: {:?}", other),
        }

        cmd_tx.send(ExecutorCommand::Shutdown).unwrap();
        handle.await.unwrap();
    }
}
