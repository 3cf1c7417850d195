//! HTTP client for the chat service.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::types::{AuthMode, AuthResponse, Credentials, ErrorBody, Message, SendMessageRequest};
use crate::error::ApiError;

type ApiResult<T> = std::result::Result<T, ApiError>;

/// The remote operations the controllers depend on.
///
/// [`HttpClient`] talks to the real service; tests substitute scripted fakes.
#[async_trait]
pub trait ChatApi: Send + Sync + std::fmt::Debug {
    /// Log in or register, depending on `mode`.
    async fn authenticate(&self, mode: AuthMode, credentials: &Credentials)
    -> ApiResult<AuthResponse>;

    /// Fetch the full, ordered message history.
    async fn fetch_messages(&self, token: &str) -> ApiResult<Vec<Message>>;

    /// Submit a message and receive the full updated history.
    async fn send_message(&self, token: &str, text: &str) -> ApiResult<Vec<Message>>;
}

/// HTTP client for the chat API.
///
/// # Example
///
/// ```rust,no_run
/// use chat_sync::api::{AuthMode, ChatApi, Credentials, HttpClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new("http://localhost:5000")?;
/// let creds = Credentials { username: "alice".into(), password: "pw123".into() };
/// let auth = client.authenticate(AuthMode::Login, &creds).await?;
/// let history = client.fetch_messages(&auth.token).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HttpClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the service (e.g., "http://localhost:5000")
    pub fn new(base_url: impl AsRef<str>) -> ApiResult<Self> {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Create a new client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a new client with a custom reqwest client.
    pub fn with_client(base_url: impl AsRef<str>, http: reqwest::Client) -> ApiResult<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        // Endpoints are joined relative to the base, so it must end in '/'
        // for a path prefix like `/chat` to survive.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { base_url, http })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal helpers
    // ─────────────────────────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Url {
        self.base_url
            .join(path.trim_start_matches('/'))
            .unwrap_or_else(|_| self.base_url.clone())
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            Ok(response.json().await?)
        } else {
            // A body that is missing or not `{error}` still yields an Api error.
            let body = response.json::<ErrorBody>().await.unwrap_or_default();
            debug!(
                name: "api.response.rejected",
                status = status.as_u16(),
                has_message = body.error.is_some(),
                "Service rejected request"
            );
            Err(ApiError::Api {
                status: status.as_u16(),
                message: body.error,
            })
        }
    }
}

#[async_trait]
impl ChatApi for HttpClient {
    async fn authenticate(
        &self,
        mode: AuthMode,
        credentials: &Credentials,
    ) -> ApiResult<AuthResponse> {
        let response = self
            .http
            .post(self.url(mode.path()))
            .json(credentials)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn fetch_messages(&self, token: &str) -> ApiResult<Vec<Message>> {
        let response = self
            .http
            .get(self.url("/api/messages"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::handle_response(response).await
    }

    async fn send_message(&self, token: &str, text: &str) -> ApiResult<Vec<Message>> {
        let req = SendMessageRequest {
            text: text.to_string(),
        };
        let response = self
            .http
            .post(self.url("/api/messages"))
            .bearer_auth(token)
            .json(&req)
            .send()
            .await?;
        Self::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_onto_base() {
        let client = HttpClient::new("http://localhost:5000").unwrap();
        assert_eq!(
            client.url("/api/messages").as_str(),
            "http://localhost:5000/api/messages"
        );
        assert_eq!(
            client.url(AuthMode::Register.path()).as_str(),
            "http://localhost:5000/api/register"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let client = HttpClient::new("https://example.com/chat").unwrap();
        assert_eq!(client.base_url().as_str(), "https://example.com/chat/");
        assert_eq!(
            client.url("/api/login").as_str(),
            "https://example.com/chat/api/login"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpClient::new("not a url").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }
}
