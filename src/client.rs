//! Async HTTP client for the positioning backend.
//!
//! Thin typed wrapper over the backend's JSON API. Every method maps
//! transport and decode failures into [`ApiError`] so callers surface a
//! short operator-visible message instead of panicking; nothing here
//! retries on its own.

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Anchor, MapSnapshot, StatusSnapshot, TagMeta, TagPosition};

/// Failure of a backend call, in operator-message form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success response carrying a server-provided error message.
    #[error("{0}")]
    Server(String),
    /// Non-success response without a usable error message.
    #[error("HTTP {0}")]
    Status(u16),
    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Decoded login response of `POST /api/auth/login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginReply {
    /// Whether the credentials were accepted.
    #[serde(default)]
    pub ok: bool,
    /// Granted role name, when accepted.
    #[serde(default)]
    pub role: Option<String>,
}

/// Client for one backend instance.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the given base URL (no trailing slash needed).
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetches the full configuration document.
    pub async fn fetch_config(&self) -> Result<Value, ApiError> {
        let resp = self.http.get(self.url("/api/config")).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<Value>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// PATCHes the whole merged configuration document.
    ///
    /// On non-success the server's `{error}` message is surfaced when
    /// present, else the status code.
    pub async fn save_config(&self, document: &Value) -> Result<(), ApiError> {
        let resp = self
            .http
            .patch(self.url("/api/config"))
            .json(document)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        Ok(())
    }

    /// Fetches the read-only anchor list.
    pub async fn fetch_anchors(&self) -> Result<Vec<Anchor>, ApiError> {
        let resp = self.http.get(self.url("/api/anchors")).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<Vec<Anchor>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetches the system status snapshot.
    pub async fn fetch_status(&self) -> Result<StatusSnapshot, ApiError> {
        let resp = self.http.get(self.url("/api/status")).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<StatusSnapshot>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetches the map snapshot (extent, geofence, anchors).
    pub async fn fetch_map(&self) -> Result<MapSnapshot, ApiError> {
        let resp = self.http.get(self.url("/api/tdoa/map")).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<MapSnapshot>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetches the known tag list.
    pub async fn fetch_tags(&self) -> Result<Vec<TagMeta>, ApiError> {
        let resp = self.http.get(self.url("/api/tdoa/tags")).send().await?;
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<Vec<TagMeta>>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Fetches the latest solved position for one tag.
    ///
    /// A non-success response (e.g. no solve yet) is `Ok(None)`, not an
    /// error: the map simply draws no marker for that tick.
    pub async fn fetch_position(&self, tag_id: &str) -> Result<Option<TagPosition>, ApiError> {
        let resp = self
            .http
            .get(self.url("/api/tdoa/position"))
            .query(&[("tag_id", tag_id)])
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(None);
        }
        match resp.json::<TagPosition>().await {
            Ok(p) => Ok(Some(p)),
            Err(_) => Ok(None),
        }
    }

    /// Attempts a login with the canonical JSON contract.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginReply, ApiError> {
        let resp = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await?;
        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Ok(LoginReply {
                ok: false,
                role: None,
            });
        }
        if !resp.status().is_success() {
            return Err(error_from_response(resp).await);
        }
        resp.json::<LoginReply>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Builds the error for a non-success response: the server `{error}` body
/// message when present, else the bare status code.
async fn error_from_response(resp: reqwest::Response) -> ApiError {
    let status = resp.status().as_u16();
    if let Ok(body) = resp.json::<Value>().await {
        if let Some(msg) = body.get("error").and_then(Value::as_str) {
            return ApiError::Server(msg.to_string());
        }
    }
    ApiError::Status(status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let client = ApiClient::new("http://host:8000/");
        assert_eq!(client.base_url(), "http://host:8000");
        assert_eq!(client.url("/api/status"), "http://host:8000/api/status");
    }

    #[test]
    fn error_messages_are_operator_readable() {
        assert_eq!(ApiError::Status(503).to_string(), "HTTP 503");
        assert_eq!(
            ApiError::Server("permission denied".into()).to_string(),
            "permission denied"
        );
        assert!(ApiError::Network("refused".into())
            .to_string()
            .starts_with("network error"));
    }

    #[test]
    fn login_reply_defaults_are_rejecting() {
        let reply: LoginReply = serde_json::from_str("{}").unwrap();
        assert!(!reply.ok);
        assert!(reply.role.is_none());
    }
}
