//! Publishing the final archive to mod-hosting platforms.
//!
//! Each target is submitted independently: a missing token or a rejected
//! upload affects only that target. Tokens are read from the environment at
//! submission time and never stored.
//!
//! # Sub-modules
//!
//! - [`credentials`] - Token lookup (`CredentialSource`).
//! - [`curseforge`] - CurseForge upload client.
//! - [`error`] - Publish error types.
//! - [`http`] - HTTP transport abstraction and `ureq` implementation.
//! - [`modrinth`] - Modrinth upload client.
//! - [`target`] - Platforms and configured targets.

pub mod credentials;
pub mod curseforge;
pub mod error;
pub mod http;
pub mod modrinth;
pub mod target;

use crate::config::{ProjectSettings, PublishSettings};
use crate::version::BuildVersion;
use camino::{Utf8Path, Utf8PathBuf};
use credentials::CredentialSource;
use curseforge::CurseForgeClient;
use error::PublishError;
use http::HttpTransport;
use log::info;
use modrinth::ModrinthClient;
use serde::Deserialize;
use std::fmt;
use target::{Platform, PublishTarget};

/// Release stability classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    /// Stable release.
    #[default]
    Stable,
    /// Beta release.
    Beta,
    /// Alpha release.
    Alpha,
}

impl ReleaseType {
    /// Name used by both platform APIs.
    #[must_use]
    pub const fn platform_name(self) -> &'static str {
        match self {
            Self::Stable => "release",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stable => "stable",
            Self::Beta => "beta",
            Self::Alpha => "alpha",
        })
    }
}

/// Everything submitted with the archive, shared by all targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// The final primary archive.
    pub archive: Utf8PathBuf,
    /// Release title, `[<minecraft>] <name> <mod_version>`.
    pub display_name: String,
    /// Full build version.
    pub version_number: String,
    /// Changelog text or link.
    pub changelog: String,
    /// Release stability.
    pub release_type: ReleaseType,
    /// Supported loaders, lowercase.
    pub loaders: Vec<String>,
}

impl PublishRequest {
    /// Build the request for `archive` at `version`.
    #[must_use]
    pub fn new(
        project: &ProjectSettings,
        publish: &PublishSettings,
        version: &BuildVersion,
        archive: &Utf8Path,
    ) -> Self {
        Self {
            archive: archive.to_owned(),
            display_name: format!(
                "[{}] {} {}",
                project.minecraft_version, project.display_name, project.mod_version
            ),
            version_number: version.to_string(),
            changelog: publish.changelog.clone(),
            release_type: publish.release_type,
            loaders: publish.loaders.clone(),
        }
    }

    /// File name presented to the platform.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.archive
            .file_name()
            .unwrap_or(self.archive.as_str())
            .to_owned()
    }

    /// One-line summary of the submission to `target`, for dry runs.
    #[must_use]
    pub fn describe(&self, target: &PublishTarget) -> String {
        let incompatible = if target.incompatible.is_empty() {
            String::new()
        } else {
            format!(", incompatible with {}", target.incompatible.join(", "))
        };
        format!(
            "would upload {} to {} project {} as \"{}\" ({}) for {} on {}{incompatible}",
            self.file_name(),
            target.platform,
            target.project_id,
            self.display_name,
            self.release_type,
            target.game_versions.join(", "),
            self.loaders.join(", "),
        )
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Name of the target.
    pub target: String,
    /// Id the platform assigned to the uploaded file or version.
    pub remote_id: String,
}

/// Submits archives using a transport and a credential source.
pub struct Publisher<'a> {
    transport: &'a dyn HttpTransport,
    credentials: &'a dyn CredentialSource,
}

impl<'a> Publisher<'a> {
    /// Create a publisher.
    #[must_use]
    pub fn new(transport: &'a dyn HttpTransport, credentials: &'a dyn CredentialSource) -> Self {
        Self {
            transport,
            credentials,
        }
    }

    /// Submit `request` to `target`. One attempt, no retries.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::MissingCredential`] before any network
    /// access when the token is absent, or any error from the platform.
    pub fn publish_target(
        &self,
        target: &PublishTarget,
        request: &PublishRequest,
    ) -> Result<PublishReceipt, PublishError> {
        let token = self.credentials.token(&target.token_env)?;
        let archive = std::fs::read(&request.archive)?;
        info!(
            "publishing {} to {} ({})",
            request.file_name(),
            target.name,
            target.platform
        );

        let receipt = match target.platform {
            Platform::CurseForge => {
                CurseForgeClient::new(self.transport, target, &token).upload(request, archive)
            }
            Platform::Modrinth => {
                ModrinthClient::new(self.transport, target, &token).upload(request, archive)
            }
        }?;
        info!("{} accepted upload as {}", target.name, receipt.remote_id);
        Ok(receipt)
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use super::*;

    pub(crate) fn target(platform: Platform) -> PublishTarget {
        PublishTarget {
            name: platform.to_string(),
            platform,
            project_id: match platform {
                Platform::CurseForge => "908741".to_owned(),
                Platform::Modrinth => "sk9rgfiA".to_owned(),
            },
            token_env: format!("{}_TOKEN", platform.to_string().to_uppercase()),
            game_versions: vec!["1.20.1".to_owned()],
            incompatible: vec!["rubidium".to_owned()],
            api_base: "https://api.test".to_owned(),
        }
    }

    pub(crate) fn publish_request() -> PublishRequest {
        PublishRequest {
            archive: Utf8PathBuf::from("/work/build/libs/embeddium-0.3.9+mc1.20.1.jar"),
            display_name: "[1.20.1] Embeddium 0.3.9".to_owned(),
            version_number: "0.3.9+mc1.20.1".to_owned(),
            changelog: "https://example.test/changelog".to_owned(),
            release_type: ReleaseType::Stable,
            loaders: vec!["forge".to_owned(), "neoforge".to_owned()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::credentials::MockCredentialSource;
    use super::http::MockHttpTransport;
    use super::test_fixtures::{publish_request, target};
    use super::*;
    use crate::test_utils::StubTransport;
    use crate::version::VersionSuffix;

    #[test]
    fn request_uses_bracketed_display_name() {
        let project = ProjectSettings {
            archives_base_name: "embeddium".to_owned(),
            mod_version: "0.3.9".to_owned(),
            minecraft_version: "1.20.1".to_owned(),
            maven_group: None,
            display_name: "Embeddium".to_owned(),
        };
        let publish = PublishSettings {
            changelog: "notes".to_owned(),
            release_type: ReleaseType::Beta,
            loaders: vec!["forge".to_owned()],
            targets: Vec::new(),
        };
        let version = BuildVersion::new("0.3.9", VersionSuffix::Release, "1.20.1");

        let request = PublishRequest::new(
            &project,
            &publish,
            &version,
            Utf8Path::new("build/libs/embeddium-0.3.9+mc1.20.1.jar"),
        );

        assert_eq!(request.display_name, "[1.20.1] Embeddium 0.3.9");
        assert_eq!(request.version_number, "0.3.9+mc1.20.1");
        assert_eq!(request.file_name(), "embeddium-0.3.9+mc1.20.1.jar");
        assert_eq!(request.release_type, ReleaseType::Beta);
    }

    #[test]
    fn release_types_map_to_platform_names() {
        assert_eq!(ReleaseType::Stable.platform_name(), "release");
        assert_eq!(ReleaseType::Beta.platform_name(), "beta");
        assert_eq!(ReleaseType::Alpha.platform_name(), "alpha");
        assert_eq!(ReleaseType::default(), ReleaseType::Stable);
    }

    #[test]
    fn describe_mentions_platform_project_and_peers() {
        let text = publish_request().describe(&target(Platform::Modrinth));
        assert!(text.contains("modrinth project sk9rgfiA"));
        assert!(text.contains("(stable)"));
        assert!(text.contains("incompatible with rubidium"));
    }

    fn offline_transport() -> MockHttpTransport {
        let mut transport = MockHttpTransport::new();
        transport.expect_get().never();
        transport.expect_post_multipart().never();
        transport
    }

    #[test]
    fn missing_token_fails_without_network_access() {
        let mut credentials = MockCredentialSource::new();
        credentials.expect_token().returning(|variable| {
            Err(PublishError::MissingCredential {
                variable: variable.to_owned(),
            })
        });
        let transport = offline_transport();

        let err = Publisher::new(&transport, &credentials)
            .publish_target(&target(Platform::CurseForge), &publish_request())
            .expect_err("no token");

        assert_eq!(
            err,
            PublishError::MissingCredential {
                variable: "CURSEFORGE_TOKEN".to_owned()
            }
        );
    }

    #[test]
    fn missing_archive_is_an_io_error() {
        let mut credentials = MockCredentialSource::new();
        credentials
            .expect_token()
            .returning(|_| Ok("token".to_owned()));
        let transport = offline_transport();

        let err = Publisher::new(&transport, &credentials)
            .publish_target(&target(Platform::Modrinth), &publish_request())
            .expect_err("archive absent");
        assert!(matches!(err, PublishError::Io { .. }));
    }

    #[test]
    fn publish_dispatches_on_platform() {
        let dir = tempfile::tempdir().expect("temp dir");
        let archive = Utf8PathBuf::try_from(dir.path().join("mod.jar")).expect("utf8");
        std::fs::write(&archive, b"PK").expect("write archive");
        let request = PublishRequest {
            archive,
            ..publish_request()
        };

        let mut credentials = MockCredentialSource::new();
        credentials
            .expect_token()
            .withf(|variable| variable == "MODRINTH_TOKEN")
            .returning(|_| Ok("token".to_owned()));
        let transport = StubTransport::new()
            .respond("/v2/project/rubidium", r#"{"id": "Ru8x7Gq1"}"#)
            .respond("/v2/version", r#"{"id": "Vx1y2z3A"}"#);

        let receipt = Publisher::new(&transport, &credentials)
            .publish_target(&target(Platform::Modrinth), &request)
            .expect("published");

        assert_eq!(
            receipt,
            PublishReceipt {
                target: "modrinth".to_owned(),
                remote_id: "Vx1y2z3A".to_owned(),
            }
        );
    }
}
