//! HTTP transport for publishing.
//!
//! Provides a trait-based abstraction over the two request shapes the
//! platform clients need, JSON `GET` and multipart `POST`, so tests can
//! replay canned responses without network access.

use super::error::PublishError;
use sha2::{Digest, Sha256};
use std::sync::OnceLock;
use std::time::Duration;

/// Network timeout for a single request, uploads included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const BOUNDARY_PREFIX: &str = "packwright-";

/// Longest excerpt of an error response kept in messages.
const ERROR_BODY_LIMIT: usize = 300;

/// Target URL and headers of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute URL.
    pub url: String,
    /// Header name/value pairs, in insertion order.
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// Create a request for `url` with no headers.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: Vec::new(),
        }
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_owned(), value.into()));
        self
    }

    /// Return the value of the first header named `name`, ignoring case.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Part {
    name: String,
    filename: Option<String>,
    content_type: String,
    data: Vec<u8>,
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartBody {
    parts: Vec<Part>,
}

impl MultipartBody {
    /// Create an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a JSON field.
    #[must_use]
    pub fn json(mut self, name: &str, value: &serde_json::Value) -> Self {
        self.parts.push(Part {
            name: name.to_owned(),
            filename: None,
            content_type: "application/json".to_owned(),
            data: value.to_string().into_bytes(),
        });
        self
    }

    /// Append a file field.
    #[must_use]
    pub fn file(mut self, name: &str, filename: &str, data: Vec<u8>) -> Self {
        self.parts.push(Part {
            name: name.to_owned(),
            filename: Some(filename.to_owned()),
            content_type: "application/java-archive".to_owned(),
            data,
        });
        self
    }

    /// Field names in order.
    #[must_use]
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|part| part.name.clone()).collect()
    }

    /// Raw bytes of the field named `name`.
    #[must_use]
    pub fn part_data(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.data.as_slice())
    }

    /// Multipart boundary for this body.
    ///
    /// Derived from the part contents so identical bodies encode
    /// identically, and never occurring inside any part.
    #[must_use]
    pub fn boundary(&self) -> String {
        let mut salt: u64 = 0;
        loop {
            let mut hasher = Sha256::new();
            hasher.update(salt.to_le_bytes());
            for part in &self.parts {
                hasher.update(&part.data);
            }
            let digest = format!("{:x}", hasher.finalize());
            let candidate = format!("{BOUNDARY_PREFIX}{}", &digest[..24]);
            if !self.parts.iter().any(|part| part.mentions(&candidate)) {
                return candidate;
            }
            salt += 1;
        }
    }

    /// Value of the `Content-Type` header for a body encoded with `boundary`.
    #[must_use]
    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={boundary}")
    }

    /// Encode the body using `boundary`.
    #[must_use]
    pub fn to_bytes(&self, boundary: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for part in &self.parts {
            out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            let disposition = match &part.filename {
                Some(filename) => format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{filename}\"\r\n",
                    part.name
                ),
                None => format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name),
            };
            out.extend_from_slice(disposition.as_bytes());
            let content_type = format!("Content-Type: {}\r\n\r\n", part.content_type);
            out.extend_from_slice(content_type.as_bytes());
            out.extend_from_slice(&part.data);
            out.extend_from_slice(b"\r\n");
        }
        out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        out
    }
}

impl Part {
    fn mentions(&self, needle: &str) -> bool {
        self.name.contains(needle)
            || self.filename.as_deref().is_some_and(|filename| filename.contains(needle))
            || self
                .data
                .windows(needle.len())
                .any(|window| window == needle.as_bytes())
    }
}

/// HTTP operations used by the platform clients.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    /// Perform a `GET` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] for transport failures and error statuses.
    fn get(&self, request: &HttpRequest) -> Result<String, PublishError>;

    /// Perform a multipart `POST` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] for transport failures and error statuses.
    fn post_multipart(
        &self,
        request: &HttpRequest,
        body: &MultipartBody,
    ) -> Result<String, PublishError>;
}

/// HTTP transport using `ureq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl HttpTransport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<String, PublishError> {
        let mut builder = http_agent().get(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder
            .call()
            .map_err(|e| map_ureq_error(&request.url, &e))?;
        read_body(&request.url, response)
    }

    fn post_multipart(
        &self,
        request: &HttpRequest,
        body: &MultipartBody,
    ) -> Result<String, PublishError> {
        let mut builder = http_agent().post(&request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let boundary = body.boundary();
        let payload = body.to_bytes(&boundary);
        let response = builder
            .header("Content-Type", MultipartBody::content_type(&boundary))
            .send(payload.as_slice())
            .map_err(|e| map_ureq_error(&request.url, &e))?;
        read_body(&request.url, response)
    }
}

fn read_body(
    url: &str,
    response: ureq::http::Response<ureq::Body>,
) -> Result<String, PublishError> {
    let status = response.status().as_u16();
    let body = response
        .into_body()
        .read_to_string()
        .map_err(|e| PublishError::Http {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
    if (200..300).contains(&status) {
        Ok(body)
    } else {
        Err(status_error(url, status, &body))
    }
}

/// Shared `ureq` agent with request timeout configuration.
///
/// Error statuses come back as responses so their bodies can be read.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map an unsuccessful status and its response body to a [`PublishError`].
fn status_error(url: &str, status: u16, body: &str) -> PublishError {
    match status {
        401 | 403 => PublishError::Unauthorized {
            url: url.to_owned(),
        },
        404 => PublishError::NotFound {
            url: url.to_owned(),
        },
        _ => {
            let excerpt = body.trim();
            let reason = match excerpt.char_indices().nth(ERROR_BODY_LIMIT) {
                Some((cut, _)) => format!("status {status}: {}...", &excerpt[..cut]),
                None if excerpt.is_empty() => format!("status {status}"),
                None => format!("status {status}: {excerpt}"),
            };
            PublishError::Http {
                url: url.to_owned(),
                reason,
            }
        }
    }
}

/// Map a ureq transport error to a [`PublishError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> PublishError {
    PublishError::Http {
        url: url.to_owned(),
        reason: err.to_string(),
    }
}
