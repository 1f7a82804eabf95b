//! Trending search keywords from an RSS feed (Google Trends by default).
//!
//! Keywords only seed extra queries for the sweep, so a failing feed is
//! logged and yields an empty list instead of an error.

use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;

use crate::client::{HttpFetcher, RequestProfile};
use crate::error::ScraperError;

#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// Up to `limit` trending keywords, most prominent first.
    async fn trending_keywords(&self, limit: usize) -> Vec<String>;
}

pub struct TrendsFeed {
    url: String,
    fetcher: Arc<HttpFetcher>,
}

impl TrendsFeed {
    #[must_use]
    pub fn new(url: impl Into<String>, fetcher: Arc<HttpFetcher>) -> Self {
        Self {
            url: url.into(),
            fetcher,
        }
    }
}

#[async_trait]
impl TrendingSource for TrendsFeed {
    async fn trending_keywords(&self, limit: usize) -> Vec<String> {
        let body = match self.fetcher.get_text(&self.url, RequestProfile::Default).await {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "trending feed fetch failed");
                return Vec::new();
            }
        };
        match parse_item_titles(&body, &self.url) {
            Ok(mut titles) => {
                titles.truncate(limit);
                titles
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "trending feed parse failed");
                Vec::new()
            }
        }
    }
}

/// A source that never yields keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrends;

#[async_trait]
impl TrendingSource for NoTrends {
    async fn trending_keywords(&self, _limit: usize) -> Vec<String> {
        Vec::new()
    }
}

/// Extract the `<title>` of every `<item>`, deduplicated case-insensitively.
///
/// # Errors
///
/// Returns [`ScraperError::Xml`] if the document is malformed.
pub fn parse_item_titles(xml: &str, context: &str) -> Result<Vec<String>, ScraperError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut titles: Vec<String> = Vec::new();
    let mut in_item = false;
    let mut in_title = false;
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"item" => in_item = true,
                b"title" if in_item => {
                    in_title = true;
                    current.clear();
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_title => {
                let text = t.unescape().map_err(|e| ScraperError::Xml {
                    context: context.to_owned(),
                    reason: e.to_string(),
                })?;
                current.push_str(&text);
            }
            Ok(Event::CData(c)) if in_title => {
                current.push_str(&String::from_utf8_lossy(&c));
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"title" if in_title => {
                    in_title = false;
                    let keyword = current.trim();
                    if !keyword.is_empty()
                        && !titles.iter().any(|t| t.eq_ignore_ascii_case(keyword))
                    {
                        titles.push(keyword.to_owned());
                    }
                }
                b"item" => in_item = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ScraperError::Xml {
                    context: context.to_owned(),
                    reason: e.to_string(),
                })
            }
            _ => {}
        }
    }

    Ok(titles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:ht="https://trends.google.com/trending/rss">
  <channel>
    <title>Daily Search Trends</title>
    <item><title>magnetic phone mount</title><ht:approx_traffic>50000+</ht:approx_traffic></item>
    <item><title><![CDATA[posture corrector]]></title></item>
    <item><title>Magnetic Phone Mount</title></item>
    <item><title>ice roller &amp; gua sha</title></item>
  </channel>
</rss>"#;

    #[test]
    fn reads_item_titles_but_not_channel_title() {
        let titles = parse_item_titles(FEED, "test").unwrap();
        assert_eq!(
            titles,
            vec![
                "magnetic phone mount".to_string(),
                "posture corrector".to_string(),
                "ice roller & gua sha".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_feed_is_an_xml_error() {
        let err = parse_item_titles("<rss><item><title>x</item>", "test").unwrap_err();
        assert!(matches!(err, ScraperError::Xml { .. }));
    }

    #[tokio::test]
    async fn no_trends_is_empty() {
        assert!(NoTrends.trending_keywords(5).await.is_empty());
    }
}
