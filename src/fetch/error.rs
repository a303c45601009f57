//! Error types for the fetch module.
//!
//! Every page-level variant carries the page number so the aggregator can
//! log exactly where pagination stopped.

use thiserror::Error;

/// Maximum number of response-body bytes kept in [`FetchError::HttpStatus`].
pub const MAX_ERROR_BODY_BYTES: usize = 512;

/// Errors that can occur while fetching a page of job orders.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching page {page}: {source}")]
    Transport {
        /// The page being fetched.
        page: u32,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching page {page}")]
    Timeout {
        /// The page being fetched.
        page: u32,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} fetching page {page}: {body}")]
    HttpStatus {
        /// The page being fetched.
        page: u32,
        /// The HTTP status code.
        status: u16,
        /// Leading excerpt of the response body.
        body: String,
    },

    /// Response body was not valid JSON.
    #[error("invalid JSON in response for page {page}: {source}")]
    Decode {
        /// The page being fetched.
        page: u32,
        /// The underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured API base is not a usable http(s) URL.
    #[error("invalid API base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The configured API key cannot be sent as a header value.
    #[error("API key contains characters that are not valid in an HTTP header")]
    InvalidApiKey,

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Creates a network error, mapping timeouts to [`FetchError::Timeout`].
    pub fn transport(page: u32, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout { page }
        } else {
            Self::Transport { page, source }
        }
    }

    /// Creates an HTTP status error, keeping at most
    /// [`MAX_ERROR_BODY_BYTES`] of the body.
    pub fn http_status(page: u32, status: u16, body: &str) -> Self {
        Self::HttpStatus {
            page,
            status,
            body: truncate_body(body),
        }
    }

    /// Creates a decode error.
    pub fn decode(page: u32, source: serde_json::Error) -> Self {
        Self::Decode { page, source }
    }

    /// Creates an invalid base URL error.
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }

    /// Returns the page this error refers to, if any.
    #[must_use]
    pub fn page(&self) -> Option<u32> {
        match self {
            Self::Transport { page, .. }
            | Self::Timeout { page }
            | Self::HttpStatus { page, .. }
            | Self::Decode { page, .. } => Some(*page),
            Self::InvalidBaseUrl { .. } | Self::InvalidApiKey | Self::ClientBuild { .. } => None,
        }
    }
}

fn truncate_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= MAX_ERROR_BODY_BYTES {
        return trimmed.to_string();
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &trimmed[..end])
}
