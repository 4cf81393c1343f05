//! Publish targets.

use serde::Deserialize;
use std::fmt;

/// Supported hosting platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// CurseForge upload API.
    CurseForge,
    /// Modrinth v2 API.
    Modrinth,
}

impl Platform {
    /// Production API base URL.
    #[must_use]
    pub const fn default_api_base(self) -> &'static str {
        match self {
            Self::CurseForge => "https://minecraft.curseforge.com",
            Self::Modrinth => "https://api.modrinth.com",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CurseForge => "curseforge",
            Self::Modrinth => "modrinth",
        })
    }
}

/// A configured destination for the final archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
    /// Unique name, used for `--target` and task names.
    pub name: String,
    /// Hosting platform.
    pub platform: Platform,
    /// Platform project id.
    pub project_id: String,
    /// Environment variable holding the API token.
    pub token_env: String,
    /// Game versions the upload declares.
    pub game_versions: Vec<String>,
    /// Slugs of projects that cannot be installed alongside this one.
    pub incompatible: Vec<String>,
    /// API base URL without a trailing slash.
    pub api_base: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        platform: Platform,
    }

    #[test]
    fn platforms_deserialize_from_lowercase_names() {
        let cf: Holder = toml::from_str("platform = \"curseforge\"").expect("valid");
        let mr: Holder = toml::from_str("platform = \"modrinth\"").expect("valid");
        assert_eq!(cf.platform, Platform::CurseForge);
        assert_eq!(mr.platform, Platform::Modrinth);
        assert!(toml::from_str::<Holder>("platform = \"github\"").is_err());
    }

    #[test]
    fn display_matches_configuration_name() {
        assert_eq!(Platform::CurseForge.to_string(), "curseforge");
        assert_eq!(Platform::Modrinth.to_string(), "modrinth");
    }
}
