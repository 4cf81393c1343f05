//! Project configuration loading and validation.
//!
//! The pipeline reads a single `packwright.toml` at startup. Raw TOML is
//! deserialized with serde and then validated into [`BuildSettings`], which
//! is immutable for the rest of the invocation. Missing or malformed fields
//! fail here rather than when a task first needs them.
//!
//! Relative paths are resolved against the directory containing the
//! configuration file.

use crate::artefact::remap::RemapCommand;
use crate::artefact::source_set::{SourceSetGroup, SourceSetKind};
use crate::exec::DEFAULT_COMMAND_TIMEOUT;
use crate::publish::ReleaseType;
use crate::publish::target::{Platform, PublishTarget};
use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "packwright.toml";

/// Errors raised while loading or validating the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or does not match the schema.
    #[error("invalid configuration in {path}: {reason}")]
    Parse {
        /// Path of the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse error.
        reason: String,
    },

    /// A required field is missing or empty.
    #[error("required field `{field}` is missing or empty")]
    MissingField {
        /// Dotted path of the field.
        field: String,
    },

    /// A field has a value that cannot be used.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// A required source set is not configured.
    #[error("source set `{kind}` must be configured")]
    MissingSourceSet {
        /// The missing source set.
        kind: SourceSetKind,
    },

    /// Two publish targets share a name.
    #[error("publish target `{name}` is defined more than once")]
    DuplicateTarget {
        /// The duplicated target name.
        name: String,
    },

    /// A publish target was requested that is not configured.
    #[error("unknown publish target `{name}`; configured targets: {available}")]
    UnknownTarget {
        /// The requested name.
        name: String,
        /// Comma-separated configured target names.
        available: String,
    },

    /// Publishing was requested but no `[publish]` section exists.
    #[error("no [publish] section configured")]
    PublishingNotConfigured,
}

/// Result type alias using [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Validated, immutable project settings.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    /// Directory containing the configuration file.
    pub root: Utf8PathBuf,
    /// Project identity and versions.
    pub project: ProjectSettings,
    /// Output directory layout.
    pub layout: LayoutSettings,
    /// Configured source sets, ordered by kind.
    pub source_sets: Vec<SourceSetGroup>,
    /// Archive content options.
    pub jar: JarSettings,
    /// External remapper, or `None` for an identity copy.
    pub remap: Option<RemapCommand>,
    /// Publishing metadata and targets.
    pub publish: Option<PublishSettings>,
}

/// Project identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Base name of every archive.
    pub archives_base_name: String,
    /// Semantic base version.
    pub mod_version: String,
    /// Target game version.
    pub minecraft_version: String,
    /// Maven group, recorded in the jar manifest when present.
    pub maven_group: Option<String>,
    /// Human-readable mod name used in release titles.
    pub display_name: String,
}

/// Output directory layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSettings {
    /// Root of build outputs.
    pub build_dir: Utf8PathBuf,
    /// Secondary directory receiving a copy of the final archive.
    pub bin_dir: Utf8PathBuf,
    /// Version-independent file name of the latest archive copy.
    pub latest_name: String,
}

/// Archive content options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JarSettings {
    /// Archive paths of resources in which `${version}` is substituted.
    pub expand: Vec<String>,
    /// Jars nested in the primary archive, resolved against the root.
    pub include: Vec<Utf8PathBuf>,
}

/// Publishing metadata shared by every target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    /// Changelog text or link.
    pub changelog: String,
    /// Release stability classification.
    pub release_type: ReleaseType,
    /// Supported mod loaders.
    pub loaders: Vec<String>,
    /// Configured targets, in file order.
    pub targets: Vec<PublishTarget>,
}

impl BuildSettings {
    /// Load and validate settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or any
    /// parse/validation error from [`BuildSettings::parse`].
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        let root = match path.parent() {
            Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
            _ => Utf8PathBuf::from("."),
        };
        Self::parse(&contents, path, &root)
    }

    /// Parse and validate settings from TOML `contents`.
    ///
    /// `origin` is only used in error messages; `root` anchors relative paths.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for TOML or schema errors, and the
    /// validation variants for semantically invalid values.
    pub fn parse(contents: &str, origin: &Utf8Path, root: &Utf8Path) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: origin.to_owned(),
            reason: e.to_string().trim().to_owned(),
        })?;
        raw.validate(root)
    }

    /// Return the configured group for `kind`.
    #[must_use]
    pub fn source_set(&self, kind: SourceSetKind) -> Option<&SourceSetGroup> {
        self.source_sets.iter().find(|group| group.kind == kind)
    }

    /// Return `true` when at least one source set declares a sources directory.
    #[must_use]
    pub fn has_sources(&self) -> bool {
        self.source_sets.iter().any(|group| group.sources.is_some())
    }
}

impl PublishSettings {
    /// Select targets by name, or every target when `names` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownTarget`] for a name that is not configured.
    pub fn select_targets(&self, names: &[String]) -> Result<Vec<&PublishTarget>> {
        if names.is_empty() {
            return Ok(self.targets.iter().collect());
        }

        names
            .iter()
            .map(|name| {
                self.targets
                    .iter()
                    .find(|target| &target.name == name)
                    .ok_or_else(|| ConfigError::UnknownTarget {
                        name: name.clone(),
                        available: self
                            .targets
                            .iter()
                            .map(|target| target.name.as_str())
                            .collect::<Vec<_>>()
                            .join(", "),
                    })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Raw schema
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    project: RawProject,
    #[serde(default)]
    layout: RawLayout,
    #[serde(default)]
    source_sets: BTreeMap<SourceSetKind, RawSourceSet>,
    #[serde(default)]
    jar: RawJar,
    remap: Option<RawRemap>,
    publish: Option<RawPublish>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProject {
    archives_base_name: String,
    mod_version: String,
    minecraft_version: String,
    maven_group: Option<String>,
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLayout {
    build_dir: Option<Utf8PathBuf>,
    bin_dir: Option<Utf8PathBuf>,
    latest_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSourceSet {
    classes: Utf8PathBuf,
    resources: Option<Utf8PathBuf>,
    sources: Option<Utf8PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawJar {
    #[serde(default)]
    expand: Vec<String>,
    #[serde(default)]
    include: Vec<Utf8PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRemap {
    program: String,
    #[serde(default)]
    args: Vec<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPublish {
    changelog: String,
    #[serde(default)]
    release_type: ReleaseType,
    loaders: Vec<String>,
    #[serde(default)]
    targets: Vec<RawTarget>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTarget {
    name: String,
    platform: Platform,
    project_id: String,
    token_env: String,
    game_versions: Option<Vec<String>>,
    #[serde(default)]
    incompatible: Vec<String>,
    api_base: Option<String>,
}

impl RawConfig {
    fn validate(self, root: &Utf8Path) -> Result<BuildSettings> {
        let project = self.project.validate()?;
        let layout = self.layout.validate(root, &project)?;
        let source_sets = validate_source_sets(self.source_sets, root)?;
        let remap = self.remap.map(RawRemap::validate).transpose()?;
        let publish = self
            .publish
            .map(|publish| publish.validate(&project))
            .transpose()?;

        let jar = self.jar.validate(root)?;

        Ok(BuildSettings {
            root: root.to_owned(),
            project,
            layout,
            source_sets,
            jar,
            remap,
            publish,
        })
    }
}

impl RawProject {
    fn validate(self) -> Result<ProjectSettings> {
        require_non_empty("project.archives_base_name", &self.archives_base_name)?;
        require_non_empty("project.mod_version", &self.mod_version)?;
        require_non_empty("project.minecraft_version", &self.minecraft_version)?;
        require_file_name_safe("project.archives_base_name", &self.archives_base_name)?;
        require_file_name_safe("project.mod_version", &self.mod_version)?;

        let display_name = self
            .display_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.archives_base_name.clone());

        Ok(ProjectSettings {
            archives_base_name: self.archives_base_name,
            mod_version: self.mod_version,
            minecraft_version: self.minecraft_version,
            maven_group: self.maven_group,
            display_name,
        })
    }
}

impl RawLayout {
    fn validate(self, root: &Utf8Path, project: &ProjectSettings) -> Result<LayoutSettings> {
        let latest_name = self
            .latest_name
            .unwrap_or_else(|| format!("{}-latest.jar", project.archives_base_name));
        require_non_empty("layout.latest_name", &latest_name)?;
        require_file_name_safe("layout.latest_name", &latest_name)?;

        Ok(LayoutSettings {
            build_dir: root.join(self.build_dir.unwrap_or_else(|| "build".into())),
            bin_dir: root.join(self.bin_dir.unwrap_or_else(|| "bin".into())),
            latest_name,
        })
    }
}

impl RawJar {
    fn validate(self, root: &Utf8Path) -> Result<JarSettings> {
        for path in &self.expand {
            require_non_empty("jar.expand", path)?;
        }
        for path in &self.include {
            if path.extension() != Some("jar") {
                return Err(ConfigError::InvalidValue {
                    field: "jar.include".to_owned(),
                    reason: format!("`{path}` is not a .jar file"),
                });
            }
        }

        Ok(JarSettings {
            expand: self.expand,
            include: self.include.iter().map(|path| root.join(path)).collect(),
        })
    }
}

impl RawRemap {
    fn validate(self) -> Result<RemapCommand> {
        require_non_empty("remap.program", &self.program)?;
        let timeout = match self.timeout_secs {
            Some(0) => {
                return Err(ConfigError::InvalidValue {
                    field: "remap.timeout_secs".to_owned(),
                    reason: "timeout must be greater than zero".to_owned(),
                });
            }
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_COMMAND_TIMEOUT,
        };
        Ok(RemapCommand::new(self.program, self.args, timeout))
    }
}

impl RawPublish {
    fn validate(self, project: &ProjectSettings) -> Result<PublishSettings> {
        require_non_empty("publish.changelog", &self.changelog)?;
        if self.loaders.is_empty() {
            return Err(ConfigError::MissingField {
                field: "publish.loaders".to_owned(),
            });
        }
        for loader in &self.loaders {
            require_non_empty("publish.loaders", loader)?;
        }

        let mut seen = BTreeSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for raw in self.targets {
            if !seen.insert(raw.name.clone()) {
                return Err(ConfigError::DuplicateTarget { name: raw.name });
            }
            targets.push(raw.validate(project)?);
        }

        Ok(PublishSettings {
            changelog: self.changelog,
            release_type: self.release_type,
            loaders: self
                .loaders
                .into_iter()
                .map(|loader| loader.to_lowercase())
                .collect(),
            targets,
        })
    }
}

impl RawTarget {
    fn validate(self, project: &ProjectSettings) -> Result<PublishTarget> {
        require_non_empty("publish.targets.name", &self.name)?;
        let field = |name: &str| format!("publish.targets.{}.{name}", self.name);
        require_non_empty(&field("project_id"), &self.project_id)?;
        require_non_empty(&field("token_env"), &self.token_env)?;

        let game_versions = self
            .game_versions
            .unwrap_or_else(|| vec![project.minecraft_version.clone()]);
        if game_versions.is_empty() {
            return Err(ConfigError::MissingField {
                field: field("game_versions"),
            });
        }

        let api_base = self
            .api_base
            .unwrap_or_else(|| self.platform.default_api_base().to_owned());
        if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: field("api_base"),
                reason: format!("`{api_base}` is not an http(s) URL"),
            });
        }

        Ok(PublishTarget {
            name: self.name,
            platform: self.platform,
            project_id: self.project_id,
            token_env: self.token_env,
            game_versions,
            incompatible: self.incompatible,
            api_base: api_base.trim_end_matches('/').to_owned(),
        })
    }
}

fn validate_source_sets(
    raw: BTreeMap<SourceSetKind, RawSourceSet>,
    root: &Utf8Path,
) -> Result<Vec<SourceSetGroup>> {
    for kind in [SourceSetKind::Main, SourceSetKind::Api] {
        if !raw.contains_key(&kind) {
            return Err(ConfigError::MissingSourceSet { kind });
        }
    }

    Ok(raw
        .into_iter()
        .map(|(kind, set)| SourceSetGroup {
            kind,
            classes: root.join(set.classes),
            resources: set.resources.map(|path| root.join(path)),
            sources: set.sources.map(|path| root.join(path)),
        })
        .collect())
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: field.to_owned(),
        });
    }
    Ok(())
}

fn require_file_name_safe(field: &str, value: &str) -> Result<()> {
    if let Some(bad) = value
        .chars()
        .find(|c| matches!(c, '/' | '\\') || c.is_whitespace())
    {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            reason: format!("`{value}` contains {bad:?}, which is not allowed in file names"),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
