//! HTTP transport for the approved job-orders API.
//!
//! [`HttpTransport`] is the seam between the pagination aggregator and the
//! network. [`ApiClient`] is the production implementation; it builds one
//! `reqwest` session per run and reuses it for every page (keep-alive and
//! cookie jar included).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{
    ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderName, HeaderValue, ORIGIN, REFERER,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use super::error::FetchError;
use crate::user_agent::{
    API_KEY_HEADER, BROWSER_ACCEPT_LANGUAGE, BROWSER_ORIGIN, BROWSER_REFERER, BROWSER_USER_AGENT,
    default_tool_user_agent,
};

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connect timeout; bounded by the request timeout when that is shorter.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Fetches a single page of job orders.
///
/// Implementations must not retry internally; retry policy belongs to the
/// caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetches `page` (1-based) of the result set for `jobsite`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on network failure, non-success status, or an
    /// undecodable body.
    async fn fetch_page(&self, jobsite: &str, page: u32) -> Result<Value, FetchError>;
}

/// Request fingerprint used when talking to the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportProfile {
    /// Browser-emulation headers, cookie jar and compression.
    #[default]
    Browser,
    /// Minimal headers with a tool-identifying User-Agent.
    Plain,
}

impl TransportProfile {
    /// Returns the stable string label used in config files.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Plain => "plain",
        }
    }
}

/// Settings needed to build an [`ApiClient`].
#[derive(Debug, Clone)]
pub struct TransportSettings {
    /// API endpoint; `jobsite` and `page` are appended as query parameters.
    pub api_base: String,
    /// Static API key; sent only when non-empty.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Header profile.
    pub profile: TransportProfile,
}

impl TransportSettings {
    /// Creates settings with the default timeout and browser profile.
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            api_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            profile: TransportProfile::Browser,
        }
    }
}

/// `reqwest`-backed [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    /// Builds a client session for the given settings.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] when `api_base` is not an
    /// http(s) URL, [`FetchError::InvalidApiKey`] when the key cannot be used
    /// as a header value, and [`FetchError::ClientBuild`] when `reqwest`
    /// rejects the configuration.
    pub fn new(settings: &TransportSettings) -> Result<Self, FetchError> {
        let base = parse_api_base(&settings.api_base)?;
        let headers = default_headers(settings.profile, &settings.api_key)?;

        let mut builder = Client::builder()
            .connect_timeout(settings.timeout.min(Duration::from_secs(CONNECT_TIMEOUT_SECS)))
            .timeout(settings.timeout)
            .default_headers(headers);

        builder = match settings.profile {
            TransportProfile::Browser => builder
                .user_agent(BROWSER_USER_AGENT)
                .cookie_store(true)
                .gzip(true),
            TransportProfile::Plain => builder.user_agent(default_tool_user_agent()),
        };

        let client = builder
            .build()
            .map_err(|source| FetchError::ClientBuild { source })?;
        debug!(base = %base, profile = settings.profile.as_str(), "API client ready");
        Ok(Self { client, base })
    }

    /// Returns the full request URL for a page.
    #[must_use]
    pub fn page_url(&self, jobsite: &str, page: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("jobsite", jobsite)
            .append_pair("page", &page.to_string());
        url
    }
}

#[async_trait]
impl HttpTransport for ApiClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_page(&self, jobsite: &str, page: u32) -> Result<Value, FetchError> {
        let url = self.page_url(jobsite, page);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(page, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::transport(page, e))?;

        if !status.is_success() {
            return Err(FetchError::http_status(page, status.as_u16(), &body));
        }

        debug!(page, bytes = body.len(), "page received");
        serde_json::from_str(&body).map_err(|e| FetchError::decode(page, e))
    }
}

/// Validates and normalizes the configured API base (trailing `/` dropped).
///
/// # Errors
///
/// Returns [`FetchError::InvalidBaseUrl`] for unparseable or non-http(s) URLs.
pub fn parse_api_base(api_base: &str) -> Result<Url, FetchError> {
    let trimmed = api_base.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|_| FetchError::invalid_base_url(api_base))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(FetchError::invalid_base_url(api_base));
    }
    Ok(url)
}

fn default_headers(profile: TransportProfile, api_key: &str) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    if profile == TransportProfile::Browser {
        headers.insert(ORIGIN, HeaderValue::from_static(BROWSER_ORIGIN));
        headers.insert(REFERER, HeaderValue::from_static(BROWSER_REFERER));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
        );
    }

    let api_key = api_key.trim();
    if !api_key.is_empty() {
        let mut value = HeaderValue::from_str(api_key).map_err(|_| FetchError::InvalidApiKey)?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
    }

    Ok(headers)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_base_trims_trailing_slash() {
        let url = parse_api_base("https://api.example.com/v1/filter/").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/filter");
    }

    #[test]
    fn test_parse_api_base_rejects_non_http_scheme() {
        assert!(matches!(
            parse_api_base("ftp://api.example.com"),
            Err(FetchError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_parse_api_base_rejects_garbage() {
        assert!(parse_api_base("not a url").is_err());
        assert!(parse_api_base("").is_err());
    }

    #[test]
    fn test_page_url_encodes_jobsite() {
        let client =
            ApiClient::new(&TransportSettings::new("https://api.example.com/filter")).unwrap();
        let url = client.page_url("Czech republic", 3);
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("jobsite".to_string(), "Czech republic".to_string()),
                ("page".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_url_keeps_existing_query() {
        let client =
            ApiClient::new(&TransportSettings::new("https://api.example.com/filter?lang=en"))
                .unwrap();
        let url = client.page_url("Japan", 1);
        assert_eq!(url.query(), Some("lang=en&jobsite=Japan&page=1"));
    }

    #[test]
    fn test_browser_headers_include_fingerprint() {
        let headers = default_headers(TransportProfile::Browser, "").unwrap();
        assert_eq!(headers.get(ORIGIN).unwrap(), BROWSER_ORIGIN);
        assert_eq!(headers.get(REFERER).unwrap(), BROWSER_REFERER);
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert!(headers.get(API_KEY_HEADER).is_none());
    }

    #[test]
    fn test_plain_headers_skip_browser_fingerprint() {
        let headers = default_headers(TransportProfile::Plain, "secret").unwrap();
        assert!(headers.get(ORIGIN).is_none());
        assert!(headers.get(REFERER).is_none());
        assert_eq!(headers.get(API_KEY_HEADER).unwrap(), "secret");
    }

    #[test]
    fn test_api_key_with_control_characters_rejected() {
        assert!(matches!(
            default_headers(TransportProfile::Browser, "bad\nkey"),
            Err(FetchError::InvalidApiKey)
        ));
    }

    #[test]
    fn test_transport_profile_serde_labels() {
        let profile: TransportProfile = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(profile, TransportProfile::Plain);
        assert_eq!(
            serde_json::to_string(&TransportProfile::Browser).unwrap(),
            "\"browser\""
        );
    }
}
