//! Error types for the packwright pipeline.
//!
//! This module defines the crate-level error that every task surfaces to the
//! operator. Concern-specific errors (configuration, assembly, publishing,
//! task graph) are wrapped so the CLI can print one human-readable message
//! and exit non-zero.

use crate::artefact::assembly_error::AssemblyError;
use crate::config::ConfigError;
use crate::graph::GraphError;
use crate::publish::error::PublishError;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors that can occur while running the build pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The project configuration could not be loaded or failed validation.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An archive could not be assembled.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// The task graph is malformed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Submitting the archive to a publish target failed.
    #[error("publishing to {target} failed: {source}")]
    Publish {
        /// Name of the publish target whose submission failed.
        target: String,
        /// The underlying publish failure.
        #[source]
        source: PublishError,
    },

    /// An external tool (remapper, git) exited unsuccessfully.
    #[error("{program} failed: {message}")]
    ExternalTool {
        /// The program that was invoked.
        program: String,
        /// Captured stderr or a description of the failure.
        message: String,
    },

    /// An external tool did not finish within its timeout.
    #[error("{program} timed out after {secs} seconds")]
    CommandTimeout {
        /// The program that was invoked.
        program: String,
        /// The timeout that elapsed.
        secs: u64,
    },

    /// Copying the final archive to a fixed location failed.
    #[error("organizing build files failed: {reason}")]
    OrganizeFailed {
        /// Description of the copy failure.
        reason: String,
    },

    /// A task required an input archive that does not exist.
    #[error("expected archive {path} does not exist")]
    MissingArchive {
        /// Path where the archive was expected.
        path: Utf8PathBuf,
    },

    /// One or more tasks failed; their dependents were skipped.
    #[error("{count} task(s) failed: {tasks}")]
    TasksFailed {
        /// Number of failed tasks.
        count: usize,
        /// Comma-separated names of the failed tasks.
        tasks: String,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write output.
    #[error("failed to write output")]
    WriteFailed {
        /// The underlying error that caused the write to fail.
        #[source]
        source: std::io::Error,
    },

    /// Test stub received an unexpected or mismatched invocation.
    #[cfg(any(test, feature = "test-support"))]
    #[error("stub mismatch: {message}")]
    StubMismatch {
        /// Description of what was expected versus what was received.
        message: String,
    },
}

/// Result type alias using [`PipelineError`].
pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_tool_error_includes_program_and_message() {
        let err = PipelineError::ExternalTool {
            program: "java".to_owned(),
            message: "mapping file not found".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("java"));
        assert!(msg.contains("mapping file not found"));
    }

    #[test]
    fn publish_error_names_the_target() {
        let err = PipelineError::Publish {
            target: "modrinth".to_owned(),
            source: PublishError::MissingCredential {
                variable: "MODRINTH_TOKEN".to_owned(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("modrinth"));
        assert!(msg.contains("MODRINTH_TOKEN"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn timeout_error_reports_seconds() {
        let err = PipelineError::CommandTimeout {
            program: "git".to_owned(),
            secs: 300,
        };
        assert_eq!(err.to_string(), "git timed out after 300 seconds");
    }

    #[test]
    fn tasks_failed_lists_task_names() {
        let err = PipelineError::TasksFailed {
            count: 2,
            tasks: "remapJar, publish-curseforge".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("2 task(s) failed"));
        assert!(msg.contains("publish-curseforge"));
    }

    #[test]
    fn write_failed_preserves_source() {
        let source = std::io::Error::other("broken pipe");
        let err = PipelineError::WriteFailed { source };
        assert!(err.to_string().contains("write"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
