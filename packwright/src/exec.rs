//! External command execution.
//!
//! Git queries and the remapping tool run through the [`CommandExecutor`]
//! seam so tests can substitute canned responses. The system implementation
//! enforces a timeout to prevent hangs on wedged tools.

use crate::error::{PipelineError, Result};
use log::{debug, trace};
use std::io::{self, Read};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use wait_timeout::ChildExt;

/// Default timeout for external commands (5 minutes).
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs a command with arguments and returns the captured output.
    ///
    /// A non-zero exit status is not an error at this level; callers decide
    /// how to interpret it.
    ///
    /// # Errors
    ///
    /// Returns any I/O error encountered while spawning the command, or
    /// [`PipelineError::CommandTimeout`] if it does not finish in time.
    fn run<'a>(&self, program: &str, args: &[&'a str]) -> Result<Output>;
}

/// Executes commands on the host system with a timeout.
#[derive(Debug, Clone, Copy)]
pub struct SystemCommandExecutor {
    timeout: Duration,
}

impl SystemCommandExecutor {
    /// Create an executor that kills commands running longer than `timeout`.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Return the configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemCommandExecutor {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_COMMAND_TIMEOUT)
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        debug!("running {program} {}", args.join(" "));

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Drained while waiting; a full pipe would block the child.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        match child.wait_timeout(self.timeout)? {
            Some(status) => {
                trace!("{program} exited with {status}");
                Ok(Output {
                    status,
                    stdout: collect(stdout)?,
                    stderr: collect(stderr)?,
                })
            }
            None => {
                // The process may already be gone. Readers stay detached as
                // a grandchild may still hold the pipes.
                let _ = child.kill();
                let _ = child.wait();
                Err(PipelineError::CommandTimeout {
                    program: program.to_owned(),
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

type Reader = JoinHandle<io::Result<Vec<u8>>>;

fn drain(pipe: Option<impl Read + Send + 'static>) -> Reader {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buffer)?;
        }
        Ok(buffer)
    })
}

fn collect(reader: Reader) -> Result<Vec<u8>> {
    let bytes = reader
        .join()
        .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")))?;
    Ok(bytes)
}

/// Return trimmed stderr, or a placeholder when the tool printed nothing.
#[must_use]
pub fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        format!("exited with {}", output.status)
    } else {
        trimmed.to_owned()
    }
}
