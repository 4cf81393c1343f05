//! Jar assembly from source-set outputs.
//!
//! Archives are reproducible: entries are written in sorted order with a
//! fixed timestamp and a generated `META-INF/MANIFEST.MF`. Inputs from
//! several producers are merged; directories are shared, but a file path
//! supplied twice, or a file standing where another producer needs a
//! directory, is an [`AssemblyError::EntryCollision`].
//!
//! Only the primary archive carries nested jars, listed under
//! `[jar].include` and stored in [`NESTED_JAR_DIR`].

use super::assembly_error::AssemblyError;
use super::source_set::{ArchiveEntry, SourceSetGroup};
use crate::config::{JarSettings, ProjectSettings};
use crate::version::BuildVersion;
use camino::{Utf8Path, Utf8PathBuf};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Archive path of the generated manifest.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// Archive directory holding jars nested in the primary archive.
pub const NESTED_JAR_DIR: &str = "META-INF/jars";

/// Token replaced by the build version in expanded resources.
pub const VERSION_TOKEN: &str = "${version}";

const MANIFEST_ORIGIN: &str = "generated manifest";

const META_INF: &str = "META-INF";

/// Summary of a written archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledArchive {
    /// Where the archive was written.
    pub path: Utf8PathBuf,
    /// Number of file entries, excluding the manifest.
    pub files: usize,
}

/// Writes jars for one build version.
#[derive(Debug, Clone, Copy)]
pub struct JarAssembler<'a> {
    project: &'a ProjectSettings,
    version: &'a BuildVersion,
    jar: &'a JarSettings,
}

impl<'a> JarAssembler<'a> {
    /// Create an assembler stamping archives with `version`.
    #[must_use]
    pub fn new(
        project: &'a ProjectSettings,
        version: &'a BuildVersion,
        jar: &'a JarSettings,
    ) -> Self {
        Self {
            project,
            version,
            jar,
        }
    }

    /// Merge the classes and resources of every group into `dest`, along
    /// with the included jars under [`NESTED_JAR_DIR`].
    ///
    /// # Errors
    ///
    /// Returns [`AssemblyError::EntryCollision`] when two producers supply
    /// the same file, [`AssemblyError::MissingInclude`] for an included jar
    /// that does not exist, or an I/O or zip error while writing.
    pub fn assemble_primary(
        &self,
        groups: &[SourceSetGroup],
        dest: &Utf8Path,
    ) -> Result<AssembledArchive, AssemblyError> {
        let mut entries = Vec::new();
        for group in groups {
            entries.extend(group.output_entries()?);
        }
        entries.extend(self.nested_entries()?);
        self.write(entries, dest)
    }

    /// Write the classes and resources of `api` alone into `dest`.
    ///
    /// # Errors
    ///
    /// As for [`JarAssembler::assemble_primary`].
    pub fn assemble_api(
        &self,
        api: &SourceSetGroup,
        dest: &Utf8Path,
    ) -> Result<AssembledArchive, AssemblyError> {
        self.write(api.output_entries()?, dest)
    }

    /// Merge the source trees of every group into `dest`.
    ///
    /// # Errors
    ///
    /// As for [`JarAssembler::assemble_primary`].
    pub fn assemble_sources(
        &self,
        groups: &[SourceSetGroup],
        dest: &Utf8Path,
    ) -> Result<AssembledArchive, AssemblyError> {
        let mut entries = Vec::new();
        for group in groups {
            entries.extend(group.source_entries()?);
        }
        self.write(entries, dest)
    }

    /// Render the manifest for this build.
    #[must_use]
    pub fn manifest(&self) -> String {
        let mut manifest = format!(
            "Manifest-Version: 1.0\r\nImplementation-Title: {}\r\nImplementation-Version: {}\r\n",
            self.project.archives_base_name, self.version
        );
        if let Some(group) = &self.project.maven_group {
            manifest.push_str(&format!("Implementation-Vendor: {group}\r\n"));
        }
        manifest.push_str("\r\n");
        manifest
    }

    fn nested_entries(&self) -> Result<Vec<ArchiveEntry>, AssemblyError> {
        self.jar
            .include
            .iter()
            .map(|jar| match jar.file_name() {
                Some(name) if jar.is_file() => Ok(ArchiveEntry {
                    path: format!("{NESTED_JAR_DIR}/{name}"),
                    source: jar.clone(),
                    origin: format!("included {jar}"),
                }),
                _ => Err(AssemblyError::MissingInclude { path: jar.clone() }),
            })
            .collect()
    }

    fn write(
        &self,
        entries: Vec<ArchiveEntry>,
        dest: &Utf8Path,
    ) -> Result<AssembledArchive, AssemblyError> {
        let files = merge_entries(entries)?;
        if files.is_empty() {
            return Err(AssemblyError::Empty {
                path: dest.to_owned(),
            });
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AssemblyError::Io {
                path: parent.to_owned(),
                source,
            })?;
        }

        let partial = Utf8PathBuf::from(format!("{dest}.part"));
        let result = self.write_zip(&files, &partial);
        if result.is_err() {
            // Best effort: the partial file may not exist.
            let _ = std::fs::remove_file(&partial);
        }
        result?;
        std::fs::rename(&partial, dest).map_err(|source| AssemblyError::Io {
            path: dest.to_owned(),
            source,
        })?;

        debug!("wrote {dest} ({} files)", files.len());
        Ok(AssembledArchive {
            path: dest.to_owned(),
            files: files.len(),
        })
    }

    fn write_zip(
        &self,
        files: &BTreeMap<String, ArchiveEntry>,
        dest: &Utf8Path,
    ) -> Result<(), AssemblyError> {
        let zip_err = |source| AssemblyError::Zip {
            path: dest.to_owned(),
            source,
        };
        let io_err = |path: &Utf8Path| {
            let path = path.to_owned();
            move |source| AssemblyError::Io { path, source }
        };

        let file = File::create(dest).map_err(io_err(dest))?;
        let mut zip = ZipWriter::new(BufWriter::new(file));
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        zip.add_directory("META-INF/", options).map_err(zip_err)?;
        zip.start_file(MANIFEST_PATH, options).map_err(zip_err)?;
        zip.write_all(self.manifest().as_bytes())
            .map_err(io_err(dest))?;

        for item in ordered_items(files) {
            match item {
                Item::Directory(name) => {
                    zip.add_directory(name, options).map_err(zip_err)?;
                }
                Item::File(entry) => {
                    zip.start_file(entry.path.as_str(), options)
                        .map_err(zip_err)?;
                    self.copy_entry(entry, &mut zip)?;
                }
            }
        }

        let mut inner = zip.finish().map_err(zip_err)?;
        inner.flush().map_err(io_err(dest))?;
        Ok(())
    }

    fn copy_entry(
        &self,
        entry: &ArchiveEntry,
        out: &mut impl Write,
    ) -> Result<(), AssemblyError> {
        let io_err = |source| AssemblyError::Io {
            path: entry.source.clone(),
            source,
        };

        if self.jar.expand.iter().any(|path| path == &entry.path) {
            let text = std::fs::read_to_string(&entry.source).map_err(|source| {
                if source.kind() == std::io::ErrorKind::InvalidData {
                    AssemblyError::ExpandNotText {
                        path: entry.path.clone(),
                    }
                } else {
                    io_err(source)
                }
            })?;
            let expanded = text.replace(VERSION_TOKEN, &self.version.to_string());
            return out.write_all(expanded.as_bytes()).map_err(io_err);
        }

        let mut input = File::open(&entry.source).map_err(io_err)?;
        std::io::copy(&mut input, out).map_err(io_err)?;
        Ok(())
    }
}

/// Merge entries by archive path, rejecting duplicate files.
///
/// A file whose path is also a parent directory of another entry collides
/// with that entry. The generated manifest path is reserved.
///
/// # Errors
///
/// Returns [`AssemblyError::EntryCollision`] naming both producers.
pub fn merge_entries(
    entries: impl IntoIterator<Item = ArchiveEntry>,
) -> Result<BTreeMap<String, ArchiveEntry>, AssemblyError> {
    let mut merged: BTreeMap<String, ArchiveEntry> = BTreeMap::new();
    for entry in entries {
        let inside_manifest = parent_dirs(&entry.path).any(|dir| dir == MANIFEST_PATH);
        if entry.path == MANIFEST_PATH || inside_manifest {
            return Err(AssemblyError::EntryCollision {
                path: MANIFEST_PATH.to_owned(),
                first: MANIFEST_ORIGIN.to_owned(),
                second: entry.origin,
            });
        }
        if let Some(existing) = merged.get(&entry.path) {
            return Err(AssemblyError::EntryCollision {
                path: entry.path,
                first: existing.origin.clone(),
                second: entry.origin,
            });
        }
        merged.insert(entry.path.clone(), entry);
    }

    if let Some(file) = merged.get(META_INF) {
        return Err(AssemblyError::EntryCollision {
            path: META_INF.to_owned(),
            first: MANIFEST_ORIGIN.to_owned(),
            second: file.origin.clone(),
        });
    }
    for (path, entry) in &merged {
        if let Some(file) = parent_dirs(path).find_map(|dir| merged.get(dir)) {
            return Err(AssemblyError::EntryCollision {
                path: file.path.clone(),
                first: file.origin.clone(),
                second: entry.origin.clone(),
            });
        }
    }
    Ok(merged)
}

/// Parent directories of an archive path, without trailing slashes.
fn parent_dirs(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(index, _)| &path[..index])
}

enum Item<'a> {
    Directory(String),
    File(&'a ArchiveEntry),
}

/// Interleave implied directories with files so parents precede children.
fn ordered_items(files: &BTreeMap<String, ArchiveEntry>) -> Vec<Item<'_>> {
    let mut directories: BTreeSet<String> = files
        .keys()
        .flat_map(|path| parent_dirs(path))
        .map(|dir| format!("{dir}/"))
        .collect();
    directories.remove("META-INF/");

    let mut items: Vec<(String, Item<'_>)> = directories
        .into_iter()
        .map(|dir| (dir.clone(), Item::Directory(dir)))
        .chain(
            files
                .iter()
                .map(|(path, entry)| (path.clone(), Item::File(entry))),
        )
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items.into_iter().map(|(_, item)| item).collect()
}

#[cfg(test)]
#[path = "assembler_tests.rs"]
mod tests;
