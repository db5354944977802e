//! Shell command flavor
//!
//! Each expression runs in a fresh `sh -c`. Standard output is the result;
//! a non-zero exit is an evaluation error carrying standard error.

use repline_core::{Evaluator, FlavorConfig};
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Shell failures
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to start shell: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("exit status {code}: {stderr}")]
    Failed { code: i32, stderr: String },
    #[error("terminated by signal: {stderr}")]
    Terminated { stderr: String },
}

pub fn flavor() -> FlavorConfig {
    FlavorConfig::new("Shell", "source.shell").with_prompt("sh>")
}

/// Runs expressions through `sh -c`
#[derive(Debug, Default)]
pub struct Shell {
    cwd: Option<PathBuf>,
}

impl Shell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run commands in `cwd` instead of the current directory
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl Evaluator for Shell {
    type Error = ShellError;

    fn execute(&mut self, expression: &str) -> Result<String, ShellError> {
        let mut command = Command::new("sh");
        command.arg("-c").arg(expression);
        if let Some(ref cwd) = self.cwd {
            command.current_dir(cwd);
        }

        tracing::debug!(%expression, "Running shell command");
        let output = command.output()?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        } else {
            match output.status.code() {
                Some(code) => Err(ShellError::Failed { code, stderr }),
                None => Err(ShellError::Terminated { stderr }),
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_stdout_is_result() {
        assert_eq!(Shell::new().execute("echo hello").unwrap(), "hello");
    }

    #[test]
    fn test_non_zero_exit_is_error() {
        let error = Shell::new().execute("echo oops >&2; exit 3").unwrap_err();
        match error {
            ShellError::Failed { code, ref stderr } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(Shell::new().format_error(&error), "exit status 3: oops");
    }

    #[test]
    fn test_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let mut shell = Shell::new().with_cwd(dir.path());
        assert_eq!(shell.execute("ls").unwrap(), "marker.txt");
    }

    #[test]
    fn test_flavor_prompt() {
        assert_eq!(flavor().prompt, "sh>");
    }
}
