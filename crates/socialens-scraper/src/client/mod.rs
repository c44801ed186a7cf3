//! HTTP page fetching with per-request header profiles.

mod origin;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::platform::parse_url;

pub use origin::extract_origin;
pub(crate) use origin::extract_domain;

pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Header and timeout profile applied to one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub timeout: Duration,
    /// Send browser-like `Accept-Language`, `Referer` and `Cache-Control`.
    pub browser_headers: bool,
}

impl RequestProfile {
    /// The plain client identity used for the first attempt.
    #[must_use]
    pub fn primary(user_agent: &str, timeout_secs: u64) -> Self {
        Self {
            user_agent: user_agent.to_owned(),
            timeout: Duration::from_secs(timeout_secs),
            browser_headers: false,
        }
    }

    /// A desktop-browser identity used after the primary attempt is rejected.
    #[must_use]
    pub fn browser(timeout_secs: u64) -> Self {
        Self {
            user_agent: BROWSER_FALLBACK_UA.to_owned(),
            timeout: Duration::from_secs(timeout_secs),
            browser_headers: true,
        }
    }
}

/// A successfully retrieved page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

/// Network seam for the fetch chain.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` with the given profile.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, an unparseable URL, or a
    /// non-2xx response.
    async fn get(&self, url: &str, profile: &RequestProfile) -> Result<FetchedPage, FetchError>;
}

/// [`PageFetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates an `HttpFetcher`. Timeouts and user agents come from the
    /// [`RequestProfile`] of each request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get(&self, url: &str, profile: &RequestProfile) -> Result<FetchedPage, FetchError> {
        let parsed = parse_url(url).ok_or_else(|| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: "not an absolute http(s) URL with a host".to_owned(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                url: url.to_owned(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let mut request = self
            .client
            .get(parsed.clone())
            .timeout(profile.timeout)
            .header(reqwest::header::USER_AGENT, &profile.user_agent)
            .header(
                reqwest::header::ACCEPT,
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            );

        if profile.browser_headers {
            request = request
                .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                .header(reqwest::header::REFERER, extract_origin(parsed.as_str()))
                .header(reqwest::header::CACHE_CONTROL, "no-cache");
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: parsed.to_string(),
            });
        }

        let body = response.text().await?;
        Ok(FetchedPage {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_profile_uses_configured_identity() {
        let profile = RequestProfile::primary("socialens-test/0.1", 10);
        assert_eq!(profile.user_agent, "socialens-test/0.1");
        assert_eq!(profile.timeout, Duration::from_secs(10));
        assert!(!profile.browser_headers);
    }

    #[test]
    fn browser_profile_uses_fallback_ua() {
        let profile = RequestProfile::browser(15);
        assert_eq!(profile.user_agent, BROWSER_FALLBACK_UA);
        assert_eq!(profile.timeout, Duration::from_secs(15));
        assert!(profile.browser_headers);
    }

    #[tokio::test]
    async fn invalid_url_is_rejected_before_any_request() {
        let fetcher = HttpFetcher::new().expect("client builds");
        let err = fetcher
            .get("ftp://example.com/file", &RequestProfile::primary("ua", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }), "got {err:?}");
    }
}
