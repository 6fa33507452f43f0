use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_TYPE, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::url_utils;

/// Thin wrapper over a shared reqwest client.
///
/// Page fetches are gated on status and content type; `fetch_text` is the
/// ungated variant used for robots.txt.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A fetched HTML page with the `Last-Modified` value already resolved, so
/// the extractor never has to touch the response again.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub body: String,
    pub last_modified: DateTime<Utc>,
}

/// Plain text response for auxiliary fetches (robots.txt).
#[derive(Debug, Clone)]
pub struct TextResponse {
    pub content: String,
    pub status_code: u16,
}

impl HttpClient {
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::ClientBuild(e.to_string()))?;

        Ok(Self { client })
    }

    /// GET an HTML page. Non-200 statuses and non-HTML content types are
    /// errors; redirects follow the client default.
    pub async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !url_utils::is_html_content_type(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        // RFC 1123 dates parse under the RFC 2822 grammar; anything else
        // falls back to the fetch time.
        let last_modified = response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        let body = String::from_utf8(bytes.to_vec()).map_err(|_| FetchError::InvalidUtf8)?;

        Ok(FetchedPage {
            body,
            last_modified,
        })
    }

    /// GET without status or content-type gating.
    pub async fn fetch_text(&self, url: &str) -> Result<TextResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;
        let status_code = response.status().as_u16();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e.to_string()))?;
        let content = String::from_utf8_lossy(&bytes).into_owned();

        Ok(TextResponse {
            content,
            status_code,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timeout")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("received HTTP status {0}")]
    HttpStatus(u16),

    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("response body is not valid UTF-8")]
    InvalidUtf8,

    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    fn from_reqwest(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(error.to_string())
        }
    }
}
