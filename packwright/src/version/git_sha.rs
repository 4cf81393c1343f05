//! Git commit id newtype.
//!
//! Validates that the value is a non-empty, lowercase hexadecimal string
//! of 7–40 characters, matching the range of abbreviated to full git
//! object names.

use std::fmt;
use thiserror::Error;

/// Minimum length of an abbreviated git SHA (7 hex characters).
const MIN_LEN: usize = 7;

/// Maximum length of a full git SHA-1 (40 hex characters).
const MAX_LEN: usize = 40;

/// A git commit id failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid git SHA \"{value}\": {reason}")]
pub struct InvalidGitSha {
    /// The rejected SHA string.
    pub value: String,
    /// Description of the validation failure.
    pub reason: String,
}

/// A validated abbreviated or full git commit SHA.
///
/// # Examples
///
/// ```
/// use packwright::version::git_sha::GitSha;
///
/// let sha: GitSha = "abc1234".try_into().expect("valid SHA");
/// assert_eq!(sha.as_str(), "abc1234");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitSha(String);

impl GitSha {
    /// Return the SHA as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for GitSha {
    type Error = InvalidGitSha;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        validate_git_sha(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for GitSha {
    type Error = InvalidGitSha;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        validate_git_sha(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for GitSha {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_git_sha(value: &str) -> Result<(), InvalidGitSha> {
    let reject = |reason: String| InvalidGitSha {
        value: value.to_owned(),
        reason,
    };

    if value.len() < MIN_LEN {
        return Err(reject(format!(
            "SHA must be at least {MIN_LEN} characters, got {}",
            value.len()
        )));
    }
    if value.len() > MAX_LEN {
        return Err(reject(format!(
            "SHA must be at most {MAX_LEN} characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(reject(format!("non-hex character '{bad}'")));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(reject("SHA must be lowercase".to_owned()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::abbreviated("abc1234")]
    #[case::long_abbreviation("1a2b3c4d5e6f")]
    #[case::full("0123456789abcdef0123456789abcdef01234567")]
    fn accepts_well_formed_ids(#[case] value: &str) {
        let sha = GitSha::try_from(value).expect("valid SHA");
        assert_eq!(sha.as_str(), value);
    }

    #[rstest]
    #[case::empty("")]
    #[case::too_short("abc123")]
    #[case::too_long("0123456789abcdef0123456789abcdef012345678")]
    #[case::non_hex("abc123g")]
    #[case::uppercase("ABC1234")]
    #[case::git_error_text("fatal: not a git repository")]
    fn rejects_malformed_ids(#[case] value: &str) {
        let err = GitSha::try_from(value).expect_err("invalid SHA");
        assert_eq!(err.value, value);
    }

    #[test]
    fn display_shows_inner_value() {
        let sha = GitSha::try_from(String::from("deadbeef")).expect("known good");
        assert_eq!(format!("{sha}"), "deadbeef");
    }
}
