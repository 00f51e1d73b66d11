use std::collections::HashSet;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};
use url::Url;

use nn_core::{Error, FeedFetcher, Result};

/// Fetches an RSS or Atom feed over HTTP and lists the article URLs
/// it advertises.
#[derive(Debug, Clone, Default)]
pub struct RssFetcher {
    client: Client,
}

impl RssFetcher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FeedFetcher for RssFetcher {
    async fn entry_urls(&self, feed_url: &str) -> Result<Vec<String>> {
        let parsed = Url::parse(feed_url)
            .map_err(|e| Error::SourceFetch(format!("invalid feed URL {}: {}", feed_url, e)))?;
        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| Error::SourceFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceFetch(format!(
                "{} returned HTTP {}",
                feed_url, status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::SourceFetch(e.to_string()))?;
        let feed = feed_rs::parser::parse(&bytes[..])
            .map_err(|e| Error::SourceFetch(format!("{}: {}", feed_url, e)))?;

        Ok(feed
            .entries
            .into_iter()
            .filter_map(|entry| entry.links.into_iter().next().map(|link| link.href))
            .collect())
    }
}

/// Union of entry URLs across all configured feeds, in first-seen order.
/// A feed that fails to fetch or parse is logged and skipped; it never
/// aborts the other feeds.
pub async fn collect_entry_urls(fetcher: &dyn FeedFetcher, feeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut urls = Vec::new();
    for feed_url in feeds {
        match fetcher.entry_urls(feed_url).await {
            Ok(entries) => {
                info!("📡 {} listed {} entries", feed_url, entries.len());
                for url in entries {
                    if seen.insert(url.clone()) {
                        urls.push(url);
                    }
                }
            }
            Err(err) => warn!("⚠️ Skipping feed {}: {}", feed_url, err),
        }
    }
    urls
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticFeeds {
        entries: HashMap<String, Vec<String>>,
    }

    #[async_trait]
    impl FeedFetcher for StaticFeeds {
        async fn entry_urls(&self, feed_url: &str) -> Result<Vec<String>> {
            self.entries
                .get(feed_url)
                .cloned()
                .ok_or_else(|| Error::SourceFetch(format!("unreachable feed {}", feed_url)))
        }
    }

    #[tokio::test]
    async fn union_keeps_first_seen_order_and_drops_duplicates() {
        let fetcher = StaticFeeds {
            entries: HashMap::from([
                (
                    "feed-one".to_string(),
                    vec!["https://a".to_string(), "https://b".to_string()],
                ),
                (
                    "feed-two".to_string(),
                    vec!["https://b".to_string(), "https://c".to_string()],
                ),
            ]),
        };

        let urls = collect_entry_urls(
            &fetcher,
            &["feed-one".to_string(), "feed-two".to_string()],
        )
        .await;
        assert_eq!(urls, vec!["https://a", "https://b", "https://c"]);
    }

    #[tokio::test]
    async fn broken_feed_does_not_abort_the_rest() {
        let fetcher = StaticFeeds {
            entries: HashMap::from([(
                "feed-ok".to_string(),
                vec!["https://a".to_string()],
            )]),
        };

        let urls = collect_entry_urls(
            &fetcher,
            &["feed-broken".to_string(), "feed-ok".to_string()],
        )
        .await;
        assert_eq!(urls, vec!["https://a"]);
    }

    #[test]
    fn rss_payload_parses_entry_links() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel>
              <title>World</title>
              <item><title>One</title><link>https://example.com/one</link></item>
              <item><title>Two</title><link>https://example.com/two</link></item>
            </channel></rss>"#;
        let feed = feed_rs::parser::parse(xml.as_bytes()).unwrap();
        let links: Vec<_> = feed
            .entries
            .into_iter()
            .filter_map(|e| e.links.into_iter().next().map(|l| l.href))
            .collect();
        assert_eq!(links, vec!["https://example.com/one", "https://example.com/two"]);
    }
}
