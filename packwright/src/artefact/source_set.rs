//! Source-set groups: the compiled outputs merged into archives.
//!
//! Each group names the directories an external compiler produced for one
//! source set. Directories that do not exist are treated as empty, matching
//! a source set with no resources.

use super::assembly_error::AssemblyError;
use camino::{Utf8Path, Utf8PathBuf};
use log::trace;
use serde::Deserialize;
use std::fmt;

/// The source sets a project may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceSetKind {
    /// Mod implementation; required.
    Main,
    /// Public API surface; required.
    Api,
    /// Compatibility code for older game internals.
    Legacy,
    /// Integrations with other mods.
    Compat,
}

impl SourceSetKind {
    /// Lowercase name as written in the configuration file.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Api => "api",
            Self::Legacy => "legacy",
            Self::Compat => "compat",
        }
    }
}

impl fmt::Display for SourceSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output directories for one source set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSetGroup {
    /// Which source set these outputs belong to.
    pub kind: SourceSetKind,
    /// Compiled classes directory.
    pub classes: Utf8PathBuf,
    /// Processed resources directory.
    pub resources: Option<Utf8PathBuf>,
    /// Source tree packaged into the sources archive.
    pub sources: Option<Utf8PathBuf>,
}

/// A file destined for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Forward-slash path inside the archive.
    pub path: String,
    /// File on disk supplying the bytes.
    pub source: Utf8PathBuf,
    /// Human-readable producer, used in collision reports.
    pub origin: String,
}

impl SourceSetGroup {
    /// Files under the classes and resources directories, sorted by path.
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::Io`] if a directory cannot be walked, or
    /// [`AssemblyError::NonUtf8Path`] for a file name that is not UTF-8.
    pub fn output_entries(&self) -> Result<Vec<ArchiveEntry>, AssemblyError> {
        let mut entries = collect_entries(&self.classes, &format!("{} classes", self.kind))?;
        if let Some(resources) = &self.resources {
            entries.extend(collect_entries(
                resources,
                &format!("{} resources", self.kind),
            )?);
        }
        Ok(entries)
    }

    /// Files under the sources directory, or nothing when none is configured.
    ///
    /// # Errors
    ///
    /// As for [`SourceSetGroup::output_entries`].
    pub fn source_entries(&self) -> Result<Vec<ArchiveEntry>, AssemblyError> {
        match &self.sources {
            Some(sources) => collect_entries(sources, &format!("{} sources", self.kind)),
            None => Ok(Vec::new()),
        }
    }
}

/// Walk `root` recursively and return its files as archive entries.
fn collect_entries(root: &Utf8Path, origin: &str) -> Result<Vec<ArchiveEntry>, AssemblyError> {
    if !root.is_dir() {
        trace!("{origin}: {root} does not exist, contributing nothing");
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();
    let mut pending = vec![root.to_owned()];
    while let Some(dir) = pending.pop() {
        let listing = std::fs::read_dir(&dir).map_err(|source| AssemblyError::Io {
            path: dir.clone(),
            source,
        })?;
        for item in listing {
            let item = item.map_err(|source| AssemblyError::Io {
                path: dir.clone(),
                source,
            })?;
            let path = Utf8PathBuf::try_from(item.path()).map_err(|err| {
                AssemblyError::NonUtf8Path {
                    path: err.into_path_buf().to_string_lossy().into_owned(),
                }
            })?;
            if path.is_dir() {
                pending.push(path);
            } else {
                entries.push(ArchiveEntry {
                    path: archive_path(root, &path),
                    source: path,
                    origin: origin.to_owned(),
                });
            }
        }
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn archive_path(root: &Utf8Path, file: &Utf8Path) -> String {
    file.strip_prefix(root)
        .unwrap_or(file)
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}
