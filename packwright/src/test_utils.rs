//! Shared test utilities for the packwright crate.
//!
//! Available to unit tests and, through the `test-support` feature, to the
//! behaviour suites under `tests/`.

use crate::error::{PipelineError, Result};
use crate::exec::CommandExecutor;
use crate::publish::error::PublishError;
use crate::publish::http::{HttpRequest, HttpTransport, MultipartBody};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    stdout_output("")
}

/// Creates a successful command `Output` with the given stdout.
#[must_use]
pub fn stdout_output(stdout: &str) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.as_bytes().to_vec(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The command to execute (e.g., "git").
    pub cmd: &'static str,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: Result<Output>,
}

impl ExpectedCall {
    /// Build an expectation from borrowed arguments.
    #[must_use]
    pub fn new(cmd: &'static str, args: &[&str], result: Result<Output>) -> Self {
        Self {
            cmd,
            args: args.iter().map(|arg| (*arg).to_owned()).collect(),
            result,
        }
    }
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
        }
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, cmd: &str, args: &[&str]) -> Result<Output> {
        let Some(call) = self.expected.borrow_mut().pop_front() else {
            return Err(PipelineError::StubMismatch {
                message: format!("unexpected invocation of {cmd} {}", args.join(" ")),
            });
        };

        if call.cmd != cmd || call.args != args {
            return Err(PipelineError::StubMismatch {
                message: format!(
                    "expected {} {}, got {cmd} {}",
                    call.cmd,
                    call.args.join(" "),
                    args.join(" ")
                ),
            });
        }

        call.result
    }
}

/// A request observed by [`StubTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method, `GET` or `POST`.
    pub method: &'static str,
    /// The request URL and headers.
    pub request: HttpRequest,
    /// Multipart part names for `POST` requests, in order.
    pub part_names: Vec<String>,
}

/// An `HttpTransport` that answers from a URL-keyed table of canned bodies.
///
/// Unknown URLs produce [`PublishError::NotFound`]. Every request is
/// recorded for later inspection.
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Vec<(String, std::result::Result<String, PublishError>)>,
    recorded: RefCell<Vec<RecordedRequest>>,
}

impl StubTransport {
    /// Create a transport with no canned responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests whose URL ends with `url_suffix` with `body`.
    #[must_use]
    pub fn respond(mut self, url_suffix: &str, body: &str) -> Self {
        self.responses
            .push((url_suffix.to_owned(), Ok(body.to_owned())));
        self
    }

    /// Answer requests whose URL ends with `url_suffix` with `error`.
    #[must_use]
    pub fn fail(mut self, url_suffix: &str, error: PublishError) -> Self {
        self.responses.push((url_suffix.to_owned(), Err(error)));
        self
    }

    /// Return every request observed so far.
    #[must_use]
    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.recorded.borrow().clone()
    }

    fn answer(&self, url: &str) -> std::result::Result<String, PublishError> {
        self.responses
            .iter()
            .find(|(suffix, _)| url.ends_with(suffix.as_str()))
            .map_or_else(
                || {
                    Err(PublishError::NotFound {
                        url: url.to_owned(),
                    })
                },
                |(_, response)| response.clone(),
            )
    }
}

impl HttpTransport for StubTransport {
    fn get(&self, request: &HttpRequest) -> std::result::Result<String, PublishError> {
        self.recorded.borrow_mut().push(RecordedRequest {
            method: "GET",
            request: request.clone(),
            part_names: Vec::new(),
        });
        self.answer(&request.url)
    }

    fn post_multipart(
        &self,
        request: &HttpRequest,
        body: &MultipartBody,
    ) -> std::result::Result<String, PublishError> {
        self.recorded.borrow_mut().push(RecordedRequest {
            method: "POST",
            request: request.clone(),
            part_names: body.part_names(),
        });
        self.answer(&request.url)
    }
}
