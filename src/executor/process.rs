//! Child process invocation through the platform shell

use anyhow::{Context, Result};
use tokio::process::Command;

use crate::messages::ExecutorOutput;

/// The program and its arguments as one shell line. Arguments carry their
/// own quoting, so they are joined verbatim.
pub fn command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(windows)]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C").arg(line);
    cmd
}

#[cfg(not(windows))]
fn shell(line: &str) -> Command {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(line);
    cmd
}

/// Run `program` with `args` and capture its output.
///
/// A non-zero exit is reported through [`ExecutorOutput::error`]; `Err` means
/// the shell itself could not be started.
pub async fn run(program: &str, args: &[String]) -> Result<ExecutorOutput> {
    let line = command_line(program, args);
    let output = shell(&line)
        .kill_on_drop(true)
        .output()
        .await
        .with_context(|| format!("Failed to start `{}`", program))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    let error = if output.status.success() {
        None
    } else {
        let mut message = format!("Command failed: {}", line);
        if !stderr.is_empty() {
            message.push('\n');
            message.push_str(&stderr);
        }
        Some(message)
    };

    Ok(ExecutorOutput {
        stdout,
        stderr,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_keeps_argument_quoting() {
        let args = vec![
            "-url".to_string(),
            "\"http://x\"".to_string(),
            "-X".to_string(),
            "GET".to_string(),
        ];
        assert_eq!(command_line("httpcli", &args), "httpcli -url \"http://x\" -X GET");
        assert_eq!(command_line("httpcli", &[]), "httpcli");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_captures_stdout() {
        let output = run("echo", &["Status: 200 OK".to_string()]).await.unwrap();
        assert_eq!(output.stdout, "Status: 200 OK\n");
        assert!(output.error.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let args = vec!["'echo oops >&2; exit 3'".to_string()];
        let output = run("sh -c", &args).await.unwrap();
        let error = output.error.unwrap();
        assert!(error.starts_with("Command failed: sh -c"));
        assert!(error.ends_with("\noops\n"));
        assert_eq!(output.stderr, "oops\n");
    }
}
