//! Build version derivation.
//!
//! Every invocation computes exactly one [`BuildVersion`]:
//! `<mod_version><suffix>+mc<minecraft_version>`. The suffix records where the
//! build came from:
//!
//! | Situation                      | Suffix               |
//! |--------------------------------|----------------------|
//! | `--release`                    | *(empty)*            |
//! | clean checkout                 | `-git.<id>`          |
//! | uncommitted or untracked files | `-git.<id>.dirty`    |
//! | no usable git data             | `-unknown`           |
//!
//! # Sub-modules
//!
//! - [`git_sha`] - Git commit id newtype (`GitSha`).
//! - [`scm`] - Source control seam and the git implementation.

pub mod git_sha;
pub mod scm;

use crate::config::ProjectSettings;
use git_sha::GitSha;
use log::debug;
use scm::SourceControl;
use std::fmt;

/// Provenance suffix appended to the base version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSuffix {
    /// Release build; no suffix.
    Release,
    /// Development build from a known commit.
    Git {
        /// Abbreviated commit id.
        id: GitSha,
        /// Whether the working tree had local changes.
        dirty: bool,
    },
    /// Development build without version control data.
    Unknown,
}

impl fmt::Display for VersionSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Release => Ok(()),
            Self::Git { id, dirty: false } => write!(f, "-git.{id}"),
            Self::Git { id, dirty: true } => write!(f, "-git.{id}.dirty"),
            Self::Unknown => f.write_str("-unknown"),
        }
    }
}

/// Determine the provenance suffix for this build. Never fails.
#[must_use]
pub fn resolve_version_suffix(release: bool, scm: &dyn SourceControl) -> VersionSuffix {
    if release {
        return VersionSuffix::Release;
    }

    match scm.head() {
        Some(state) => VersionSuffix::Git {
            id: state.abbreviated_id,
            dirty: !state.clean,
        },
        None => {
            debug!("no version control data, marking build as unknown");
            VersionSuffix::Unknown
        }
    }
}

/// The full version string embedded in every archive of one build.
///
/// # Examples
///
/// ```
/// use packwright::version::{BuildVersion, VersionSuffix};
///
/// let version = BuildVersion::new("0.3.9", VersionSuffix::Unknown, "1.20.1");
/// assert_eq!(version.to_string(), "0.3.9-unknown+mc1.20.1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildVersion {
    base: String,
    suffix: VersionSuffix,
    minecraft: String,
}

impl BuildVersion {
    /// Compose a version from its parts.
    #[must_use]
    pub fn new(base: &str, suffix: VersionSuffix, minecraft: &str) -> Self {
        Self {
            base: base.to_owned(),
            suffix,
            minecraft: minecraft.to_owned(),
        }
    }

    /// Resolve the version for `project`, consulting `scm` unless `release`.
    #[must_use]
    pub fn resolve(project: &ProjectSettings, release: bool, scm: &dyn SourceControl) -> Self {
        Self::new(
            &project.mod_version,
            resolve_version_suffix(release, scm),
            &project.minecraft_version,
        )
    }

    /// The configured base version, without suffix or game version.
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The provenance suffix.
    #[must_use]
    pub fn suffix(&self) -> &VersionSuffix {
        &self.suffix
    }

    /// The target game version.
    #[must_use]
    pub fn minecraft(&self) -> &str {
        &self.minecraft
    }
}

impl fmt::Display for BuildVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}+mc{}", self.base, self.suffix, self.minecraft)
    }
}
