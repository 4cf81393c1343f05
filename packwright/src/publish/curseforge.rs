//! CurseForge upload client.
//!
//! CurseForge identifies game versions and loaders by numeric id, so the
//! client first fetches the version catalogue and then uploads the archive
//! with a `metadata` JSON part.

use super::error::PublishError;
use super::http::{HttpRequest, HttpTransport, MultipartBody};
use super::target::PublishTarget;
use super::{PublishReceipt, PublishRequest};
use log::debug;
use serde::Deserialize;
use serde_json::{Value, json};

const TOKEN_HEADER: &str = "X-Api-Token";

#[derive(Debug, Deserialize)]
struct GameVersion {
    id: u64,
    name: String,
    #[serde(default)]
    slug: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: u64,
}

/// Uploads archives to one CurseForge project.
pub struct CurseForgeClient<'a> {
    transport: &'a dyn HttpTransport,
    target: &'a PublishTarget,
    token: &'a str,
}

impl<'a> CurseForgeClient<'a> {
    /// Create a client for `target` authenticated with `token`.
    #[must_use]
    pub fn new(
        transport: &'a dyn HttpTransport,
        target: &'a PublishTarget,
        token: &'a str,
    ) -> Self {
        Self {
            transport,
            target,
            token,
        }
    }

    /// Upload `archive` with the metadata in `request`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::UnknownGameVersion`] when a game version or
    /// loader is not in the catalogue, or any transport error.
    pub fn upload(
        &self,
        request: &PublishRequest,
        archive: Vec<u8>,
    ) -> Result<PublishReceipt, PublishError> {
        let ids = self.resolve_version_ids(request)?;
        let metadata = self.metadata(request, &ids);
        let body = MultipartBody::new()
            .json("metadata", &metadata)
            .file("file", &request.file_name(), archive);

        let url = format!(
            "{}/api/projects/{}/upload-file",
            self.target.api_base, self.target.project_id
        );
        let response = self.transport.post_multipart(&self.request(url), &body)?;
        let uploaded: UploadResponse = serde_json::from_str(&response)?;

        Ok(PublishReceipt {
            target: self.target.name.clone(),
            remote_id: uploaded.id.to_string(),
        })
    }

    /// Build the `metadata` part for already-resolved version ids.
    #[must_use]
    pub fn metadata(&self, request: &PublishRequest, game_version_ids: &[u64]) -> Value {
        let mut metadata = json!({
            "changelog": request.changelog,
            "changelogType": "markdown",
            "displayName": request.display_name,
            "gameVersions": game_version_ids,
            "releaseType": request.release_type.platform_name(),
        });
        if !self.target.incompatible.is_empty() {
            let projects: Vec<Value> = self
                .target
                .incompatible
                .iter()
                .map(|slug| json!({"slug": slug, "type": "incompatible"}))
                .collect();
            metadata["relations"] = json!({ "projects": projects });
        }
        metadata
    }

    fn resolve_version_ids(&self, request: &PublishRequest) -> Result<Vec<u64>, PublishError> {
        let url = format!("{}/api/game/versions", self.target.api_base);
        let catalogue: Vec<GameVersion> =
            serde_json::from_str(&self.transport.get(&self.request(url))?)?;
        debug!("{}: {} known game versions", self.target.name, catalogue.len());

        let lookup = |kind: &'static str, name: &str| {
            catalogue
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(name) || v.slug.eq_ignore_ascii_case(name))
                .map(|v| v.id)
                .ok_or_else(|| PublishError::UnknownGameVersion {
                    kind,
                    name: name.to_owned(),
                })
        };

        let mut ids = Vec::new();
        for version in &self.target.game_versions {
            ids.push(lookup("game version", version)?);
        }
        for loader in &request.loaders {
            ids.push(lookup("loader", loader)?);
        }
        Ok(ids)
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::new(url).header(TOKEN_HEADER, self.token)
    }
}
