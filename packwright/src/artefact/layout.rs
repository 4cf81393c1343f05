//! Output paths for one build.
//!
//! Every task reads and writes through an [`ArtifactLayout`] so that no two
//! tasks share an output path.

use super::naming::{ArchiveName, Classifier};
use crate::config::BuildSettings;
use crate::version::BuildVersion;
use camino::Utf8PathBuf;

/// Every archive path produced by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Pre-remap primary archive.
    pub dev_jar: Utf8PathBuf,
    /// Final primary archive.
    pub primary_jar: Utf8PathBuf,
    /// Pre-remap API archive.
    pub api_dev_jar: Utf8PathBuf,
    /// Final API archive.
    pub api_jar: Utf8PathBuf,
    /// Pre-remap source archive.
    pub sources_dev_jar: Utf8PathBuf,
    /// Final source archive.
    pub sources_jar: Utf8PathBuf,
    /// Version-independent copy of the primary archive.
    pub latest_copy: Utf8PathBuf,
    /// Copy of the primary archive in the secondary directory.
    pub bin_copy: Utf8PathBuf,
}

impl ArtifactLayout {
    /// Compute the layout for `settings` at `version`.
    #[must_use]
    pub fn new(settings: &BuildSettings, version: &BuildVersion) -> Self {
        let base = settings.project.archives_base_name.as_str();
        let build = &settings.layout.build_dir;
        let libs = build.join("libs");
        let devlibs = build.join("devlibs");
        let name = |classifier| ArchiveName::new(base, version, classifier).filename();
        let primary = name(None);

        Self {
            dev_jar: devlibs.join(name(Some(Classifier::Dev))),
            primary_jar: libs.join(&primary),
            api_dev_jar: libs.join(name(Some(Classifier::ApiDev))),
            api_jar: libs.join(name(Some(Classifier::Api))),
            sources_dev_jar: devlibs.join(name(Some(Classifier::Sources))),
            sources_jar: libs.join(name(Some(Classifier::Sources))),
            latest_copy: libs.join(&settings.layout.latest_name),
            bin_copy: settings.layout.bin_dir.join(primary),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::VersionSuffix;
    use camino::Utf8Path;

    const CONFIG: &str = r#"
[project]
archives_base_name = "embeddium"
mod_version = "0.3.9"
minecraft_version = "1.20.1"

[layout]
latest_name = "embeddium-latest.jar"

[source_sets.main]
classes = "classes/main"

[source_sets.api]
classes = "classes/api"
"#;

    #[test]
    fn paths_follow_build_and_bin_directories() {
        let root = Utf8Path::new("/work");
        let settings = BuildSettings::parse(CONFIG, Utf8Path::new("packwright.toml"), root)
            .expect("valid config");
        let version = BuildVersion::new("0.3.9", VersionSuffix::Release, "1.20.1");

        let layout = ArtifactLayout::new(&settings, &version);

        assert_eq!(
            layout.dev_jar,
            "/work/build/devlibs/embeddium-0.3.9+mc1.20.1-dev.jar"
        );
        assert_eq!(layout.primary_jar, "/work/build/libs/embeddium-0.3.9+mc1.20.1.jar");
        assert_eq!(
            layout.api_dev_jar,
            "/work/build/libs/embeddium-0.3.9+mc1.20.1-api-dev.jar"
        );
        assert_eq!(layout.api_jar, "/work/build/libs/embeddium-0.3.9+mc1.20.1-api.jar");
        assert_eq!(
            layout.sources_dev_jar,
            "/work/build/devlibs/embeddium-0.3.9+mc1.20.1-sources.jar"
        );
        assert_eq!(
            layout.sources_jar,
            "/work/build/libs/embeddium-0.3.9+mc1.20.1-sources.jar"
        );
        assert_eq!(layout.latest_copy, "/work/build/libs/embeddium-latest.jar");
        assert_eq!(layout.bin_copy, "/work/bin/embeddium-0.3.9+mc1.20.1.jar");
    }

    #[test]
    fn latest_copy_does_not_depend_on_version() {
        let root = Utf8Path::new("/work");
        let settings = BuildSettings::parse(CONFIG, Utf8Path::new("packwright.toml"), root)
            .expect("valid config");
        let release = BuildVersion::new("0.3.9", VersionSuffix::Release, "1.20.1");
        let unknown = BuildVersion::new("0.4.0", VersionSuffix::Unknown, "1.20.1");

        assert_eq!(
            ArtifactLayout::new(&settings, &release).latest_copy,
            ArtifactLayout::new(&settings, &unknown).latest_copy
        );
    }
}
