use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, HeaderMap, HeaderValue, PRAGMA};
use reqwest::{Client, Url};
use std::fmt;
use std::time::Duration;

pub type FetchResult<T> = Result<T, FetchError>;

/// Upstream bound used by the proxy unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(12);

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Raw upstream response: the body exactly as received plus its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: Vec<u8>,
    pub content_type: Option<String>,
}

impl FetchedPage {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl(String),
    Timeout { url: String, after: Duration },
    Status { url: String, status: u16, reason: String },
    Network(reqwest::Error, String),
    Body(reqwest::Error, String),
}

impl FetchError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, FetchError::Timeout { .. })
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::InvalidUrl(url) => write!(f, "Invalid URL: {url}"),
            FetchError::Timeout { after, .. } => {
                write!(f, "Upstream request timed out after {}ms", after.as_millis())
            }
            FetchError::Status { status, reason, .. } => write!(f, "HTTP {status}: {reason}"),
            FetchError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            FetchError::Body(e, url) => write!(f, "Failed reading body from {url}: {e}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Only absolute http(s) URLs are fetched.
pub fn validate_url(raw: &str) -> FetchResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| FetchError::InvalidUrl(raw.to_owned()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(FetchError::InvalidUrl(raw.to_owned())),
    }
}

/// Fetches team pages the way a browser would, under a hard time bound.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    timeout: Duration,
}

impl Default for PageFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl PageFetcher {
    pub fn new(timeout: Duration) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        Self {
            client: Client::builder()
                .user_agent(BROWSER_USER_AGENT)
                .default_headers(headers)
                .build()
                .unwrap_or_default(),
            timeout,
        }
    }

    /// GET `url` and return the body untouched.
    ///
    /// The whole exchange, body included, must finish within the configured
    /// bound. On expiry the in-flight request is dropped, which closes the
    /// connection, and [`FetchError::Timeout`] is returned.
    pub async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let target = validate_url(url)?;
        match tokio::time::timeout(self.timeout, self.exchange(target, url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout { url: url.to_owned(), after: self.timeout }),
        }
    }

    async fn exchange(&self, target: Url, url: &str) -> FetchResult<FetchedPage> {
        let response = self
            .client
            .get(target)
            .send()
            .await
            .map_err(|e| FetchError::Network(e, url.to_owned()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_owned(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Body(e, url.to_owned()))?;

        Ok(FetchedPage { body: body.to_vec(), content_type })
    }
}
