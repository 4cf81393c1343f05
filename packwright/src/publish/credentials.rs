//! Publish tokens, read from the environment at publish time only.

use super::error::PublishError;

/// Source of API tokens.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialSource {
    /// Return the token stored under `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingCredential`] when the variable is
    /// unset or blank.
    fn token(&self, variable: &str) -> Result<String, PublishError>;
}

/// Reads tokens from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn token(&self, variable: &str) -> Result<String, PublishError> {
        match std::env::var(variable) {
            Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_owned()),
            _ => Err(PublishError::MissingCredential {
                variable: variable.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VAR: &str = "PACKWRIGHT_TEST_TOKEN";

    #[test]
    fn set_variable_is_returned_trimmed() {
        temp_env::with_var(VAR, Some(" secret \n"), || {
            assert_eq!(EnvCredentials.token(VAR).expect("token"), "secret");
        });
    }

    #[test]
    fn unset_variable_is_missing() {
        temp_env::with_var_unset(VAR, || {
            let err = EnvCredentials.token(VAR).expect_err("unset");
            assert_eq!(
                err,
                PublishError::MissingCredential {
                    variable: VAR.to_owned()
                }
            );
        });
    }

    #[test]
    fn blank_variable_is_missing() {
        temp_env::with_var(VAR, Some("   "), || {
            assert!(EnvCredentials.token(VAR).is_err());
        });
    }
}
