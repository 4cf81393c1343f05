//! Copies of the final archive at fixed locations.
//!
//! Downstream tooling finds the newest build at a version-independent name
//! under `build/libs`, and a second copy lands in the bin directory. Each
//! copy is verified by SHA-256 against the source.

use crate::artefact::digest::compute_sha256;
use crate::artefact::layout::ArtifactLayout;
use crate::error::{PipelineError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use std::fs;

/// Copies the final primary archive to its fixed destinations.
pub struct BuildFileOrganizer<'a> {
    layout: &'a ArtifactLayout,
}

impl<'a> BuildFileOrganizer<'a> {
    /// Create an organizer for `layout`.
    #[must_use]
    pub fn new(layout: &'a ArtifactLayout) -> Self {
        Self { layout }
    }

    /// Copy the final archive to the version-independent latest name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::MissingArchive`] if the final archive does
    /// not exist, or [`PipelineError::OrganizeFailed`] if copying or
    /// verification fails.
    pub fn copy_latest(&self) -> Result<Utf8PathBuf> {
        self.copy_verified(&self.layout.latest_copy)
    }

    /// Copy the final archive, keeping its versioned name, into the bin
    /// directory.
    ///
    /// # Errors
    ///
    /// As for [`BuildFileOrganizer::copy_latest`].
    pub fn copy_to_bin(&self) -> Result<Utf8PathBuf> {
        self.copy_verified(&self.layout.bin_copy)
    }

    fn copy_verified(&self, dest: &Utf8Path) -> Result<Utf8PathBuf> {
        let source = &self.layout.primary_jar;
        if !source.is_file() {
            return Err(PipelineError::MissingArchive {
                path: source.clone(),
            });
        }

        let failed = |reason: String| PipelineError::OrganizeFailed { reason };

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| failed(format!("failed to create {parent}: {e}")))?;
        }
        fs::copy(source, dest)
            .map_err(|e| failed(format!("failed to copy {source} to {dest}: {e}")))?;

        let expected = compute_sha256(source.as_std_path())
            .map_err(|e| failed(format!("failed to hash {source}: {e}")))?;
        let actual = compute_sha256(dest.as_std_path())
            .map_err(|e| failed(format!("failed to hash {dest}: {e}")))?;
        if expected != actual {
            return Err(failed(format!(
                "{dest} has digest {actual}, expected {expected}"
            )));
        }

        info!("copied {} to {dest}", file_name(source));
        Ok(dest.to_owned())
    }
}

fn file_name(path: &Utf8Path) -> &str {
    path.file_name().unwrap_or(path.as_str())
}
