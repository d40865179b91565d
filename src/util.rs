//! Helpers for shelling out to external tools

use std::fmt;
use std::process::Output;

use slog::{debug, Logger};
use tokio::process::Command;

/// An external command failed to spawn or exited non-zero.
#[derive(Debug)]
pub enum CommandError {
    Spawn { command: String, reason: String },
    Failed { command: String, code: Option<i32>, stderr: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Spawn { command, reason } => {
                write!(f, "failed to run '{}': {}", command, reason)
            }
            CommandError::Failed { command, code, stderr } => match code {
                Some(code) => write!(f, "'{}' exited with status {}: {}", command, code, stderr),
                None => write!(f, "'{}' was terminated by a signal: {}", command, stderr),
            },
        }
    }
}

impl std::error::Error for CommandError {}

/// Run a command to completion, capturing its output.
///
/// Returns stdout on success; a failure carries the captured stderr.
pub async fn run_command(
    program: &str,
    args: &[&str],
    logger: &Logger,
) -> Result<String, CommandError> {
    let display = format!("{} {}", program, args.join(" "));
    debug!(logger, "running command"; "command" => &display);

    let output: Output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| CommandError::Spawn {
            command: display.clone(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(CommandError::Failed {
            command: display,
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::o;

    fn test_logger() -> Logger {
        Logger::root(slog::Discard, o!())
    }

    #[tokio::test]
    async fn test_successful_command_captures_stdout() {
        let out = run_command("echo", &["hello"], &test_logger()).await.unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = run_command("drover-no-such-tool", &[], &test_logger())
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let err = run_command("sh", &["-c", "echo oops >&2; exit 3"], &test_logger())
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { code, stderr, .. } => {
                assert_eq!(code, Some(3));
                assert!(stderr.contains("oops"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }
}
