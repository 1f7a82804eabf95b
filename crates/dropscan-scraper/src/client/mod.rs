//! Shared HTTP fetcher used by every storefront adapter.

mod origin;

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

pub use origin::{extract_domain, extract_store_origin};

pub(crate) const BROWSER_FALLBACK_UA: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Header profile for one request.
///
/// `Browser` mimics a desktop browser for storefronts that reject the
/// default scraper user agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestProfile {
    Default,
    Browser,
}

/// HTTP client with timeout, `User-Agent`, and retry policy baked in.
///
/// Non-2xx responses become typed [`ScraperError`]s: 429 is
/// [`ScraperError::RateLimited`], 404 is [`ScraperError::NotFound`], anything
/// else is [`ScraperError::UnexpectedStatus`].
pub struct HttpFetcher {
    client: Client,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl HttpFetcher {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_ms: backoff_base_secs.saturating_mul(1_000),
        })
    }

    /// GETs `url` and returns the body text, retrying transient failures.
    ///
    /// # Errors
    ///
    /// Returns the last [`ScraperError`] once retries are exhausted, or the
    /// first non-retriable one.
    pub async fn get_text(
        &self,
        url: &str,
        profile: RequestProfile,
    ) -> Result<String, ScraperError> {
        let referer = extract_store_origin(url);

        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let referer = referer.clone();
            async move {
                let mut request = self
                    .client
                    .get(url)
                    .header(
                        reqwest::header::ACCEPT,
                        "application/json,text/html;q=0.9,*/*;q=0.8",
                    )
                    .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
                    .header(reqwest::header::CACHE_CONTROL, "no-cache");

                if profile == RequestProfile::Browser {
                    request = request
                        .header(reqwest::header::USER_AGENT, BROWSER_FALLBACK_UA)
                        .header(reqwest::header::REFERER, &referer);
                }

                let response = request.send().await?;
                check_status(&response, url)?;
                Ok(response.text().await?)
            }
        })
        .await
    }
}

/// Map a non-success response to the matching [`ScraperError`].
pub(crate) fn check_status(response: &reqwest::Response, url: &str) -> Result<(), ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);
        return Err(ScraperError::RateLimited {
            domain: extract_domain(url),
            retry_after_secs,
        });
    }

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ScraperError::NotFound {
            url: url.to_owned(),
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(())
}
