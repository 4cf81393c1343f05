//! Archive naming policy.
//!
//! Constructs deterministic archive names in the format
//! `<base>-<version>[-<classifier>].jar`.

use crate::version::BuildVersion;
use std::fmt;

/// The fixed file extension for archives.
const ARCHIVE_EXTENSION: &str = ".jar";

/// Distinguishes secondary archives of the same build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    /// Pre-remap primary archive.
    Dev,
    /// Pre-remap API archive.
    ApiDev,
    /// Remapped API archive.
    Api,
    /// Source archive.
    Sources,
}

impl Classifier {
    /// The suffix appended after the version.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dev => "dev",
            Self::ApiDev => "api-dev",
            Self::Api => "api",
            Self::Sources => "sources",
        }
    }
}

/// A fully-qualified archive file name.
///
/// # Examples
///
/// ```
/// use packwright::artefact::naming::{ArchiveName, Classifier};
/// use packwright::version::{BuildVersion, VersionSuffix};
///
/// let version = BuildVersion::new("0.3.9", VersionSuffix::Release, "1.20.1");
/// let name = ArchiveName::new("embeddium", &version, Some(Classifier::Api));
/// assert_eq!(name.to_string(), "embeddium-0.3.9+mc1.20.1-api.jar");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveName {
    base: String,
    version: String,
    classifier: Option<Classifier>,
}

impl ArchiveName {
    /// Create a name for `base` at `version`.
    #[must_use]
    pub fn new(base: &str, version: &BuildVersion, classifier: Option<Classifier>) -> Self {
        Self {
            base: base.to_owned(),
            version: version.to_string(),
            classifier,
        }
    }

    /// Return the file name.
    #[must_use]
    pub fn filename(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ArchiveName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.base, self.version)?;
        if let Some(classifier) = self.classifier {
            write!(f, "-{}", classifier.as_str())?;
        }
        f.write_str(ARCHIVE_EXTENSION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionSuffix;
    use crate::version::git_sha::GitSha;
    use rstest::rstest;

    fn dev_version() -> BuildVersion {
        let id = GitSha::try_from("1a2b3c4").expect("valid SHA");
        BuildVersion::new(
            "0.3.9",
            VersionSuffix::Git { id, dirty: true },
            "1.20.1",
        )
    }

    #[rstest]
    #[case::primary(None, "embeddium-0.3.9-git.1a2b3c4.dirty+mc1.20.1.jar")]
    #[case::dev(Some(Classifier::Dev), "embeddium-0.3.9-git.1a2b3c4.dirty+mc1.20.1-dev.jar")]
    #[case::api_dev(
        Some(Classifier::ApiDev),
        "embeddium-0.3.9-git.1a2b3c4.dirty+mc1.20.1-api-dev.jar"
    )]
    #[case::sources(
        Some(Classifier::Sources),
        "embeddium-0.3.9-git.1a2b3c4.dirty+mc1.20.1-sources.jar"
    )]
    fn filename_embeds_version_and_classifier(
        #[case] classifier: Option<Classifier>,
        #[case] expected: &str,
    ) {
        let name = ArchiveName::new("embeddium", &dev_version(), classifier);
        assert_eq!(name.filename(), expected);
    }
}
