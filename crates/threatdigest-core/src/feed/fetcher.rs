use bytes::Bytes;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use url::Url;

use super::parser::{parse_feed, ParsedFeed};
use crate::config::AppConfig;
use crate::{Error, Result};

const MAX_FEED_BYTES: usize = 5 * 1024 * 1024;

// Rotating User-Agent pool - some mirrors reject non-browser clients
static USER_AGENT_INDEX: AtomicUsize = AtomicUsize::new(0);
const USER_AGENTS: &[&str] = &[
    // Chrome on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    // Firefox on macOS
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:121.0) Gecko/20100101 Firefox/121.0",
    // Firefox on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

/// Get the next User-Agent in rotation
fn next_user_agent() -> &'static str {
    let index = USER_AGENT_INDEX.fetch_add(1, Ordering::Relaxed) % USER_AGENTS.len();
    USER_AGENTS[index]
}

/// HTTP feed fetcher shared by the feed and social readers.
///
/// Every call is a single bounded request: a stalled host fails with a
/// timeout error instead of blocking the run.
#[derive(Clone)]
pub struct FeedFetcher {
    client: Client,
}

impl FeedFetcher {
    /// Create a new feed fetcher with configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_settings(
            Duration::from_secs(config.sync.request_timeout_secs),
            config.sync.proxy_url.as_deref(),
        )
    }

    /// Create a fetcher with an explicit request timeout and optional proxy
    pub fn with_settings(timeout: Duration, proxy_url: Option<&str>) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(10));

        if let Some(proxy) = proxy_url {
            let proxy = Proxy::all(proxy)
                .map_err(|e| Error::Config(format!("Invalid proxy URL: {}", e)))?;
            builder = builder.proxy(proxy);
            tracing::info!("Using HTTP proxy for feed fetching");
        }

        let client = builder.build()?;
        Ok(Self { client })
    }

    /// Build browser-like headers for a request
    fn build_headers(user_agent: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/rss+xml,application/atom+xml,application/xml;q=0.9,text/xml;q=0.8,*/*;q=0.5"
            )
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9")
        );
        headers.insert(
            ACCEPT_ENCODING,
            HeaderValue::from_static("gzip, deflate, br")
        );
        if let Ok(ua) = HeaderValue::from_str(user_agent) {
            headers.insert(USER_AGENT, ua);
        }
        headers
    }

    /// Fetch and parse a feed from URL
    pub async fn fetch(&self, url: &str) -> Result<ParsedFeed> {
        let content = self.fetch_raw(url).await?;
        parse_feed(&content)
    }

    /// Fetch feed content as raw bytes
    pub async fn fetch_raw(&self, url: &str) -> Result<Bytes> {
        Url::parse(url)?;

        let user_agent = next_user_agent();
        tracing::debug!("Fetching {}, User-Agent: {}", url, user_agent);

        let response = self.client
            .get(url)
            .headers(Self::build_headers(user_agent))
            .send()
            .await?;

        // Refuse an announced oversize body before reading it
        if let Some(len) = response.content_length() {
            self.ensure_content_size(usize::try_from(len).unwrap_or(usize::MAX), url)?;
        }

        let status = response.status();
        let resp_headers = response.headers().clone();
        let content = response.bytes().await?;

        self.ensure_content_size(content.len(), url)?;

        if status == StatusCode::FORBIDDEN {
            let is_cloudflare = resp_headers.get("cf-mitigated").is_some()
                || resp_headers
                    .get("server")
                    .map(|v| v.to_str().unwrap_or("").contains("cloudflare"))
                    .unwrap_or(false);

            if is_cloudflare {
                return Err(Error::FeedParse(format!(
                    "Cloudflare protection detected for URL: {}",
                    url
                )));
            }

            return Err(Error::FeedParse(format!("HTTP 403 Forbidden for URL: {}", url)));
        }

        if !status.is_success() {
            return Err(Error::FeedParse(format!(
                "HTTP {} for URL: {}",
                status,
                url
            )));
        }

        // Mirrors behind a challenge page answer 200 with HTML
        if Self::is_cloudflare_challenge(&content) {
            return Err(Error::FeedParse(format!(
                "Cloudflare JavaScript challenge detected for URL: {}",
                url
            )));
        }

        Ok(content)
    }

    /// Check if content is a Cloudflare challenge page
    fn is_cloudflare_challenge(content: &[u8]) -> bool {
        let check_len = content.len().min(2048);
        let preview = String::from_utf8_lossy(&content[..check_len]);

        preview.contains("Just a moment...")
            || preview.contains("cf-browser-verification")
            || preview.contains("_cf_chl_opt")
            || preview.contains("challenge-platform")
    }

    fn ensure_content_size(&self, size: usize, url: &str) -> Result<()> {
        if size > MAX_FEED_BYTES {
            return Err(Error::FeedParse(format!(
                "Feed too large ({} bytes) for URL: {}",
                size,
                url
            )));
        }
        Ok(())
    }
}
