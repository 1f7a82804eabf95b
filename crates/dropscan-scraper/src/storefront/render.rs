//! Headless-browser render proxy (`POST {base}/content?token=...`).

use std::time::Duration;

use reqwest::Client;

use crate::client::check_status;
use crate::error::ScraperError;

/// Client for a browserless-compatible `/content` endpoint.
///
/// The proxy loads the page in a real browser and returns the final HTML,
/// which gets past storefronts that serve an empty shell to plain fetches.
#[derive(Clone)]
pub struct RenderProxy {
    client: Client,
    base_url: Option<String>,
    token: Option<String>,
}

impl RenderProxy {
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(
        base_url: Option<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_owned()),
            token,
        })
    }

    /// `true` when both the endpoint and its access token are set.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.token.is_some()
    }

    /// Renders `url` and returns the resulting HTML.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::NotConfigured`] without any network traffic when
    /// the endpoint or token is missing, otherwise the transport or status
    /// error from the proxy.
    pub async fn render(&self, url: &str) -> Result<String, ScraperError> {
        let (Some(base), Some(token)) = (self.base_url.as_deref(), self.token.as_deref()) else {
            return Err(ScraperError::NotConfigured {
                what: "render proxy".to_owned(),
            });
        };

        let endpoint = format!("{base}/content");
        let response = self
            .client
            .post(&endpoint)
            .query(&[("token", token)])
            .json(&serde_json::json!({ "url": url }))
            .send()
            .await?;
        check_status(&response, url)?;
        Ok(response.text().await?)
    }
}

impl std::fmt::Debug for RenderProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderProxy")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[redacted]"))
            .finish_non_exhaustive()
    }
}
