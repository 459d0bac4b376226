//! Album art retrieval for surface display.
//!
//! Surfaces render cover art as a `data:` URL, so fetched images are encoded
//! once and cached by the reconciler against their source URL.
//!
//! # Example
//!
//! ```ignore
//! use sonos_deck_core::artwork::{ArtworkFetcher, HttpArtworkFetcher};
//!
//! let fetcher = HttpArtworkFetcher::new(reqwest::Client::new());
//! let image = fetcher.fetch("http://192.168.1.10:1400/getaa?s=1&u=...").await?;
//! assert!(image.starts_with("data:image/"));
//! ```

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use thiserror::Error;

use crate::protocol_constants::{MAX_ARTWORK_BODY_SIZE, SOAP_TIMEOUT_SECS};

/// MIME type assumed when the server doesn't send a usable `Content-Type`.
const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Errors that can occur while fetching album art.
#[derive(Debug, Error)]
pub enum ArtworkError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP error {0}")]
    HttpStatus(u16),

    /// Body exceeded the size limit.
    #[error("image larger than {limit} bytes")]
    TooLarge { limit: usize },

    /// Server answered with an empty body.
    #[error("empty image body")]
    Empty,
}

/// Convenient Result alias for artwork operations.
pub type ArtworkResult<T> = Result<T, ArtworkError>;

/// Fetches an image and returns it encoded for display.
#[async_trait]
pub trait ArtworkFetcher: Send + Sync {
    /// Fetches `url` and returns a `data:{mime};base64,...` string.
    async fn fetch(&self, url: &str) -> ArtworkResult<String>;
}

/// Encodes image bytes as a `data:` URL.
///
/// Parameters after the MIME type (e.g. `; charset=binary`) are dropped and
/// a missing or non-image type falls back to `image/jpeg`.
pub fn encode_data_url(content_type: Option<&str>, bytes: &[u8]) -> String {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|mime| mime.starts_with("image/"))
        .unwrap_or(DEFAULT_IMAGE_MIME);

    format!(
        "data:{};base64,{}",
        mime,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// reqwest-backed [`ArtworkFetcher`].
#[derive(Debug, Clone)]
pub struct HttpArtworkFetcher {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl HttpArtworkFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self {
            client,
            timeout: Duration::from_secs(SOAP_TIMEOUT_SECS),
            max_bytes: MAX_ARTWORK_BODY_SIZE,
        }
    }

    /// Overrides the per-image timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Overrides the largest accepted image body.
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Reads the body, giving up as soon as it exceeds `limit`.
async fn read_limited(mut response: Response, limit: usize) -> ArtworkResult<Vec<u8>> {
    if response
        .content_length()
        .is_some_and(|len| len > limit as u64)
    {
        return Err(ArtworkError::TooLarge { limit });
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        append_limited(&mut body, &chunk, limit)?;
    }
    Ok(body)
}

fn append_limited(body: &mut Vec<u8>, chunk: &[u8], limit: usize) -> ArtworkResult<()> {
    if body.len().saturating_add(chunk.len()) > limit {
        return Err(ArtworkError::TooLarge { limit });
    }
    body.extend_from_slice(chunk);
    Ok(())
}

#[async_trait]
impl ArtworkFetcher for HttpArtworkFetcher {
    async fn fetch(&self, url: &str) -> ArtworkResult<String> {
        log::debug!("[Artwork] Fetching {}", url);

        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ArtworkError::HttpStatus(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = read_limited(response, self.max_bytes).await?;
        if bytes.is_empty() {
            return Err(ArtworkError::Empty);
        }

        log::debug!("[Artwork] Fetched {} bytes from {}", bytes.len(), url);
        Ok(encode_data_url(content_type.as_deref(), &bytes))
    }
}

/// An encoded image together with the URL it was fetched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedArtwork {
    pub source_url: String,
    pub data_url: String,
}

impl CachedArtwork {
    /// Returns true if this entry was fetched from `url`.
    #[must_use]
    pub fn is_for(&self, url: &str) -> bool {
        self.source_url == url
    }
}
