//! Source control queries used to derive build provenance.
//!
//! The pipeline only needs two facts about the checkout: the abbreviated id
//! of `HEAD` and whether the working tree is clean. Every failure collapses
//! into "no VCS data" so a build outside a repository still succeeds.

use super::git_sha::GitSha;
use crate::exec::{CommandExecutor, stderr_message};
use camino::Utf8Path;
use log::debug;

/// Observed state of the repository at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoState {
    /// Abbreviated id of the checked-out commit.
    pub abbreviated_id: GitSha,
    /// `false` when tracked or untracked changes are present.
    pub clean: bool,
}

/// Abstraction over the version control system.
#[cfg_attr(test, mockall::automock)]
pub trait SourceControl {
    /// Return the current repository state, or `None` when unavailable.
    fn head(&self) -> Option<RepoState>;
}

/// Queries git through a [`CommandExecutor`].
pub struct GitSourceControl<'a> {
    executor: &'a dyn CommandExecutor,
    root: &'a Utf8Path,
}

impl<'a> GitSourceControl<'a> {
    /// Create a git query rooted at `root`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, root: &'a Utf8Path) -> Self {
        Self { executor, root }
    }

    fn git(&self, args: &[&str]) -> Option<String> {
        let mut full = vec!["-C", self.root.as_str()];
        full.extend_from_slice(args);

        match self.executor.run("git", &full) {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                debug!("git {} failed: {}", args.join(" "), stderr_message(&output));
                None
            }
            Err(err) => {
                debug!("git {} could not run: {err}", args.join(" "));
                None
            }
        }
    }
}

impl SourceControl for GitSourceControl<'_> {
    fn head(&self) -> Option<RepoState> {
        let raw_id = self.git(&["rev-parse", "--short", "HEAD"])?;
        let abbreviated_id = match GitSha::try_from(raw_id.trim()) {
            Ok(sha) => sha,
            Err(err) => {
                debug!("ignoring git output: {err}");
                return None;
            }
        };
        let status = self.git(&["status", "--porcelain"])?;

        Some(RepoState {
            abbreviated_id,
            clean: status.trim().is_empty(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, stdout_output};

    const ROOT: &str = "/work/mod";

    fn rev_parse(result: crate::error::Result<std::process::Output>) -> ExpectedCall {
        ExpectedCall::new("git", &["-C", ROOT, "rev-parse", "--short", "HEAD"], result)
    }

    fn status(result: crate::error::Result<std::process::Output>) -> ExpectedCall {
        ExpectedCall::new("git", &["-C", ROOT, "status", "--porcelain"], result)
    }

    fn head_with(calls: Vec<ExpectedCall>) -> Option<RepoState> {
        let executor = StubExecutor::new(calls);
        let state = GitSourceControl::new(&executor, Utf8Path::new(ROOT)).head();
        executor.assert_finished();
        state
    }

    #[test]
    fn clean_checkout_reports_id_and_clean() {
        let state = head_with(vec![
            rev_parse(Ok(stdout_output("1a2b3c4\n"))),
            status(Ok(stdout_output(""))),
        ])
        .expect("repository state");

        assert_eq!(state.abbreviated_id.as_str(), "1a2b3c4");
        assert!(state.clean);
    }

    #[test]
    fn untracked_files_make_the_tree_dirty() {
        let state = head_with(vec![
            rev_parse(Ok(stdout_output("1a2b3c4\n"))),
            status(Ok(stdout_output("?? notes.txt\n"))),
        ])
        .expect("repository state");

        assert!(!state.clean);
    }

    #[test]
    fn not_a_repository_yields_none_without_querying_status() {
        let state = head_with(vec![rev_parse(Ok(failure_output(
            "fatal: not a git repository",
        )))]);
        assert!(state.is_none());
    }

    #[test]
    fn missing_git_binary_yields_none() {
        let state = head_with(vec![rev_parse(Err(PipelineError::Io(
            std::io::Error::from(std::io::ErrorKind::NotFound),
        )))]);
        assert!(state.is_none());
    }

    #[test]
    fn garbage_id_yields_none() {
        let state = head_with(vec![rev_parse(Ok(stdout_output("HEAD\n")))]);
        assert!(state.is_none());
    }

    #[test]
    fn failing_status_yields_none() {
        let state = head_with(vec![
            rev_parse(Ok(stdout_output("1a2b3c4\n"))),
            status(Err(PipelineError::CommandTimeout {
                program: "git".to_owned(),
                secs: 300,
            })),
        ]);
        assert!(state.is_none());
    }
}
