use std::process::{Command, Stdio};

use thiserror::Error;

/// Failure of an external command (tmux or git).
#[derive(Debug, Error)]
pub enum CommandError {
    /// The binary could not be executed at all (not installed, not on PATH).
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The command ran but exited non-zero.
    #[error("{program} {args} failed: {stderr}")]
    Failed {
        program: String,
        args: String,
        stderr: String,
    },
}

impl CommandError {
    /// Captured stderr for a failed command, empty for spawn failures.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { stderr, .. } => stderr,
        }
    }

    pub fn is_spawn(&self) -> bool {
        matches!(self, Self::Spawn { .. })
    }
}

/// Seam between the dashboard and the processes it shells out to.
///
/// Everything the dashboard learns about tmux and git goes through this
/// trait, so tests can script the text those tools would print.
pub trait CommandRunner: Send + Sync {
    /// Run to completion and return stdout.
    fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;

    /// Run with the terminal inherited (attach / switch-client).
    fn interactive(&self, program: &str, args: &[&str]) -> Result<(), CommandError>;
}

/// Runs real processes via `std::process::Command`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                args: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn interactive(&self, program: &str, args: &[&str]) -> Result<(), CommandError> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !status.success() {
            return Err(CommandError::Failed {
                program: program.to_string(),
                args: args.join(" "),
                stderr: format!("exited with {}", status),
            });
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_error_message_includes_command_and_stderr() {
        let err = CommandError::Failed {
            program: "tmux".to_string(),
            args: "list-sessions".to_string(),
            stderr: "no server running on /tmp/tmux-1000/default".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "tmux list-sessions failed: no server running on /tmp/tmux-1000/default"
        );
        assert!(!err.is_spawn());
    }

    #[test]
    fn spawn_error_has_no_stderr() {
        let err = fake::not_found("tmux");
        assert!(err.is_spawn());
        assert_eq!(err.stderr(), "");
        assert!(err.to_string().starts_with("failed to run tmux"));
    }

    #[test]
    fn system_runner_reports_missing_binary_as_spawn() {
        let err = SystemRunner
            .output("cb-definitely-not-a-real-binary", &[])
            .unwrap_err();
        assert!(err.is_spawn());
    }
}
