//! Error types for publishing.

use thiserror::Error;

/// Errors arising while submitting an archive to a hosting platform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// The token environment variable is unset or empty.
    #[error("environment variable {variable} is not set or empty")]
    MissingCredential {
        /// Name of the variable that should hold the token.
        variable: String,
    },

    /// The platform rejected the token (HTTP 401 or 403).
    #[error("credential rejected by {url}")]
    Unauthorized {
        /// The URL that rejected the request.
        url: String,
    },

    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The request failed for another reason.
    #[error("request to {url} failed: {reason}")]
    Http {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// A configured game version or loader is unknown to the platform.
    #[error("{kind} `{name}` is not known to the platform")]
    UnknownGameVersion {
        /// What was being looked up, `game version` or `loader`.
        kind: &'static str,
        /// The name that could not be resolved.
        name: String,
    },

    /// The platform answered with a body that could not be understood.
    #[error("unexpected response: {reason}")]
    InvalidResponse {
        /// Description of the problem.
        reason: String,
    },

    /// The archive could not be read.
    #[error("failed to read archive: {reason}")]
    Io {
        /// Description of the I/O failure.
        reason: String,
    },
}

impl From<std::io::Error> for PublishError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PublishError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidResponse {
            reason: err.to_string(),
        }
    }
}
