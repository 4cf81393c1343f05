//! Test support utilities for packwright behavioural tests.
//!
//! Provides a temporary project directory with compiled source-set outputs
//! and a configuration file, plus a helper to build its pipeline context.

use camino::{Utf8Path, Utf8PathBuf};
use packwright::config::BuildSettings;
use packwright::pipeline::BuildContext;
use packwright::version::{BuildVersion, VersionSuffix};
use tempfile::TempDir;

/// Configuration shared by every scenario; publish targets point at stub URLs.
pub const CONFIG: &str = r#"
[project]
archives_base_name = "embeddium"
mod_version = "0.3.9"
minecraft_version = "1.20.1"
display_name = "Embeddium"
maven_group = "org.embeddedt"

[source_sets.main]
classes = "out/main/classes"
resources = "out/main/resources"

[source_sets.api]
classes = "out/api/classes"

[source_sets.compat]
classes = "out/compat/classes"

[publish]
changelog = "https://example.test/changelog"
release_type = "beta"
loaders = ["forge"]

[[publish.targets]]
name = "curseforge"
platform = "curseforge"
project_id = "908741"
token_env = "PACKWRIGHT_TEST_CURSEFORGE_TOKEN"
api_base = "https://cf.test"

[[publish.targets]]
name = "modrinth"
platform = "modrinth"
project_id = "sk9rgfiA"
token_env = "PACKWRIGHT_TEST_MODRINTH_TOKEN"
api_base = "https://mr.test"
"#;

/// A temporary mod project with compiled outputs on disk.
pub struct Project {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Project {
    /// Create a project with one class per source set and a resource.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let root =
            Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8");
        let project = Self { _dir: dir, root };
        project.write("out/main/classes/org/embeddedt/Embeddium.class", "main");
        project.write("out/main/resources/embeddium.mixins.json", "{}");
        project.write("out/api/classes/org/embeddedt/api/Event.class", "api");
        project.write("out/compat/classes/org/embeddedt/compat/Iris.class", "compat");
        project
    }

    /// Project root directory.
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write `contents` at `path` relative to the root.
    pub fn write(&self, path: &str, contents: &str) {
        let file = self.root.join(path);
        if let Some(parent) = file.parent() {
            std::fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        std::fs::write(file, contents).expect("failed to write fixture file");
    }

    /// Build a context at base version `mod_version`.
    pub fn context(&self, mod_version: &str, dry_run: bool) -> BuildContext {
        let settings = BuildSettings::parse(CONFIG, Utf8Path::new("packwright.toml"), &self.root)
            .expect("fixture config is valid");
        let version = BuildVersion::new(mod_version, VersionSuffix::Release, "1.20.1");
        BuildContext::new(settings, version, dry_run, Vec::new())
    }
}
