//! HTTP client for the game backend.
//!
//! `GameBackend` is the seam between the session controller and the network:
//! the TUI drives an `HttpBackend`, tests substitute an in-memory fake.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{
    ChatReply, ChatRequest, LoadReply, LoadRequest, SaveReply, SaveRequest, SavesReply,
    StartGameRequest, StartReply,
};

/// Errors from a single request/response round trip. None of them are retried.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Client misconfigured (bad base URL, TLS setup).
    Config(String),
    /// Connection refused, timeout, DNS failure.
    Network(String),
    /// Server answered with a non-success status.
    Api { status: u16, message: String },
    /// Body was not the JSON we expected.
    Parse(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Config(msg) => write!(f, "config error: {msg}"),
            ApiError::Network(msg) => write!(f, "network error: {msg}"),
            ApiError::Api { status, message } if message.is_empty() => {
                write!(f, "server error (HTTP {status})")
            }
            ApiError::Api { status, message } => {
                write!(f, "server error (HTTP {status}): {message}")
            }
            ApiError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Network(e.to_string())
    }
}

/// The backend operations the client relies on.
#[async_trait]
pub trait GameBackend: Send + Sync {
    async fn start_game(&self, role: &str) -> Result<StartReply, ApiError>;

    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError>;

    async fn save(&self, slot: &str, label: Option<&str>) -> Result<SaveReply, ApiError>;

    async fn load(&self, slot: &str) -> Result<LoadReply, ApiError>;

    async fn list_saves(&self) -> Result<SavesReply, ApiError>;

    /// Check that a static asset exists (HEAD). Used for character portraits.
    async fn probe(&self, path: &str) -> Result<(), ApiError>;
}

pub const SAVES_PATH: &str = "/api/saves";
/// Older servers only expose the list under this name.
pub const LEGACY_SAVES_PATH: &str = "/api/get_saves";

/// `GameBackend` over JSON/HTTP. Keeps a cookie jar because the server tracks
/// the running game in its session.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        R: DeserializeOwned,
    {
        debug!("POST {}", path);
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(path, response).await
    }

    async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        decode(path, response).await
    }
}

/// Turn a response into `R`, mapping non-2xx and malformed bodies to `ApiError`.
async fn decode<R: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<R, ApiError> {
    let status = response.status();
    let body = response.text().await?;
    debug!("{} -> {} ({} bytes)", path, status, body.len());

    if !status.is_success() {
        warn!("{} failed: {} - {}", path, status, body);
        return Err(ApiError::Api {
            status: status.as_u16(),
            message: body.trim().to_string(),
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        warn!("{} returned malformed JSON: {}", path, e);
        ApiError::Parse(e.to_string())
    })
}

#[async_trait]
impl GameBackend for HttpBackend {
    async fn start_game(&self, role: &str) -> Result<StartReply, ApiError> {
        info!("Starting game as role '{}'", role);
        self.post_json("/api/start_game", &StartGameRequest { role })
            .await
    }

    async fn chat(&self, message: &str) -> Result<ChatReply, ApiError> {
        info!("Sending chat message ({} chars)", message.chars().count());
        self.post_json("/api/chat", &ChatRequest { message }).await
    }

    async fn save(&self, slot: &str, label: Option<&str>) -> Result<SaveReply, ApiError> {
        info!("Saving to slot '{}'", slot);
        self.post_json("/api/save", &SaveRequest { slot, label })
            .await
    }

    async fn load(&self, slot: &str) -> Result<LoadReply, ApiError> {
        info!("Loading slot '{}'", slot);
        self.post_json("/api/load", &LoadRequest { slot }).await
    }

    async fn list_saves(&self) -> Result<SavesReply, ApiError> {
        match self.get_json(SAVES_PATH).await {
            Err(ApiError::Api { status: 404, .. }) => {
                info!("{} not found, falling back to {}", SAVES_PATH, LEGACY_SAVES_PATH);
                self.get_json(LEGACY_SAVES_PATH).await
            }
            other => other,
        }
    }

    async fn probe(&self, path: &str) -> Result<(), ApiError> {
        let response = self.client.head(self.url(path)).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            debug!("Probe {} -> {}", path, status);
            Err(ApiError::Api {
                status: status.as_u16(),
                message: String::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let err = ApiError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "server error (HTTP 500): boom");
    }

    #[test]
    fn display_omits_empty_body() {
        let err = ApiError::Api {
            status: 404,
            message: String::new(),
        };
        assert_eq!(err.to_string(), "server error (HTTP 404)");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://localhost:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:5000");
        assert_eq!(backend.url("/api/chat"), "http://localhost:5000/api/chat");
    }
}
