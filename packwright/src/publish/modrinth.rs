//! Modrinth upload client.
//!
//! Dependencies are declared by project id, so each incompatible slug is
//! resolved before the version is created with a `data` JSON part.

use super::error::PublishError;
use super::http::{HttpRequest, HttpTransport, MultipartBody};
use super::target::PublishTarget;
use super::{PublishReceipt, PublishRequest};
use serde::Deserialize;
use serde_json::{Value, json};

const USER_AGENT: &str = concat!("packwright/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Project {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CreatedVersion {
    id: String,
}

/// Creates versions on one Modrinth project.
pub struct ModrinthClient<'a> {
    transport: &'a dyn HttpTransport,
    target: &'a PublishTarget,
    token: &'a str,
}

impl<'a> ModrinthClient<'a> {
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

    /// Create a version carrying `archive`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError::NotFound`] for an incompatible slug that does
    /// not exist, or any transport error.
    pub fn upload(
        &self,
        request: &PublishRequest,
        archive: Vec<u8>,
    ) -> Result<PublishReceipt, PublishError> {
        let incompatible_ids = self
            .target
            .incompatible
            .iter()
            .map(|slug| self.resolve_project_id(slug))
            .collect::<Result<Vec<_>, _>>()?;

        let data = self.version_data(request, &incompatible_ids);
        let body = MultipartBody::new()
            .json("data", &data)
            .file("file", &request.file_name(), archive);
        let url = format!("{}/v2/version", self.target.api_base);
        let response = self.transport.post_multipart(&self.request(url), &body)?;
        let created: CreatedVersion = serde_json::from_str(&response)?;

        Ok(PublishReceipt {
            target: self.target.name.clone(),
            remote_id: created.id,
        })
    }

    /// Build the `data` part for already-resolved dependency ids.
    #[must_use]
    pub fn version_data(&self, request: &PublishRequest, incompatible_ids: &[String]) -> Value {
        let dependencies: Vec<Value> = incompatible_ids
            .iter()
            .map(|id| json!({"project_id": id, "dependency_type": "incompatible"}))
            .collect();

        json!({
            "name": request.display_name,
            "version_number": request.version_number,
            "changelog": request.changelog,
            "dependencies": dependencies,
            "game_versions": self.target.game_versions,
            "version_type": request.release_type.platform_name(),
            "loaders": request.loaders,
            "featured": false,
            "project_id": self.target.project_id,
            "file_parts": ["file"],
            "primary_file": "file",
        })
    }

    fn resolve_project_id(&self, slug: &str) -> Result<String, PublishError> {
        let url = format!("{}/v2/project/{slug}", self.target.api_base);
        let project: Project = serde_json::from_str(&self.transport.get(&self.request(url))?)?;
        Ok(project.id)
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::new(url)
            .header("Authorization", self.token)
            .header("User-Agent", USER_AGENT)
    }
}
