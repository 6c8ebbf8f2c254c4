//! REST client for the journaling backend.
//!
//! Every call is a single awaited request. Failures are classified into
//! [`ApiError`] and surfaced to the screen as a notice; nothing is retried.

mod account;
mod journals;
mod social;

use crate::config::ApiConfig;
use reqwest::multipart::Part;
use reqwest::{Body, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Backend client holding the bearer token of the signed-in user.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    page_size: u32,
    suggested_limit: u32,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("User is not authenticated.")]
    Unauthenticated,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Request timeout")]
    Timeout,

    #[error("Backend unavailable")]
    Unavailable,

    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Unexpected(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND.as_u16())
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthenticated)
            || self.status() == Some(StatusCode::UNAUTHORIZED.as_u16())
    }

    /// The server's own wording when it sent one, else `fallback`.
    pub fn message_or(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Unexpected(message) => message.clone(),
            ApiError::Unauthenticated => self.to_string(),
            _ => fallback.to_string(),
        }
    }
}

fn classify(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_connect() {
        ApiError::Unavailable
    } else {
        ApiError::Request(e)
    }
}

#[derive(Deserialize)]
struct MessageBody {
    message: Option<String>,
}

/// `{ "message": ... }` from an error body, else the raw text, else the
/// reason phrase.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(MessageBody {
        message: Some(message),
    }) = serde_json::from_str::<MessageBody>(body)
    {
        return message;
    }
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

async fn check(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let path = response.url().path().to_string();
    let body = response.text().await.unwrap_or_default();
    let message = error_message(status, &body);
    warn!("{} {}: {}", status.as_u16(), path, message);
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Streams a local image into a multipart part.
async fn image_part(path: &Path) -> Result<Part, ApiError> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|source| ApiError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let part = Part::stream(Body::from(file))
        .file_name(name)
        .mime_str(image_mime(path))?;
    Ok(part)
}

impl ApiClient {
    pub fn new(config: &ApiConfig, token: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            token,
            page_size: config.page_size,
            suggested_limit: config.suggested_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<&str, ApiError> {
        self.token.as_deref().ok_or(ApiError::Unauthenticated)
    }

    fn get(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.get(self.url(path)).bearer_auth(self.bearer()?))
    }

    fn post(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.post(self.url(path)).bearer_auth(self.bearer()?))
    }

    fn put(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.put(self.url(path)).bearer_auth(self.bearer()?))
    }

    fn delete(&self, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.delete(self.url(path)).bearer_auth(self.bearer()?))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(classify)?;
        debug!("{} {}", response.status().as_u16(), response.url().path());
        check(response).await
    }

    async fn json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.json(self.get(path)?).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn client(token: Option<&str>) -> ApiClient {
        let config = ApiConfig {
            url: "http://localhost:5000/".to_string(),
            ..ApiConfig::default()
        };
        ApiClient::new(&config, token.map(String::from)).unwrap()
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let api = client(None);
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(
            api.url("/api/auth/me"),
            "http://localhost:5000/api/auth/me"
        );
    }

    #[test]
    fn test_error_message_prefers_json_message() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Username taken"}"#),
            "Username taken"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, ""), "Not Found");
    }

    #[test]
    fn test_status_helpers() {
        let not_found = ApiError::Status {
            status: 404,
            message: String::new(),
        };
        assert!(not_found.is_not_found());
        assert_eq!(not_found.message_or("Failed"), "Failed");

        let unauthorized = ApiError::Status {
            status: 401,
            message: "Token expired".to_string(),
        };
        assert!(unauthorized.is_unauthorized());
        assert_eq!(unauthorized.message_or("Failed"), "Token expired");
        assert!(ApiError::Unauthenticated.is_unauthorized());
    }

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a/photo.JPG")), "image/jpeg");
        assert_eq!(image_mime(Path::new("a.png")), "image/png");
        assert_eq!(image_mime(Path::new("notes")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_requests_without_token_fail_fast() {
        let api = client(None);
        let err = api.me().await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthenticated));
    }

    #[tokio::test]
    async fn test_missing_image_is_io_error() {
        let err = image_part(Path::new("/definitely/not/here.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }
}
