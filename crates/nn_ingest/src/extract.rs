use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use scraper::{Html, Selector};
use tokio::time::sleep;
use tracing::warn;

use nn_core::{Article, ArticleExtractor, Error, Result};

const MAX_ATTEMPTS: u32 = 3;
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Extracts a structured [`Article`] from an arbitrary news page.
///
/// The fetch retries with capped exponential backoff; parsing prefers
/// OpenGraph metadata and falls back to plain document structure.
#[derive(Debug, Clone, Default)]
pub struct HtmlExtractor {
    client: Client,
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Extraction(format!("{} returned HTTP {}", url, status)));
        }

        response
            .text()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))
    }

    async fn fetch_with_retry(&self, url: &str) -> Result<String> {
        let mut delay = Duration::from_millis(500);
        let mut attempt = 1;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(err) if attempt < MAX_ATTEMPTS => {
                    warn!(
                        "⚠️ Fetch attempt {}/{} failed for {}: {}",
                        attempt, MAX_ATTEMPTS, url, err
                    );
                    sleep(delay).await;
                    delay = (delay * 2).min(MAX_BACKOFF);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl ArticleExtractor for HtmlExtractor {
    async fn extract(&self, url: &str) -> Result<Article> {
        let body = self.fetch_with_retry(url).await?;
        // scraper's DOM is not Send, so parsing stays in a sync helper
        // and never crosses an await point.
        parse_article(url, &body)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::Extraction(format!("bad selector {}: {}", css, e)))
}

fn meta_content(document: &Html, property: &str) -> Result<Option<String>> {
    let sel = selector(&format!(r#"meta[property="{}"]"#, property))?;
    Ok(document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn first_text(document: &Html, css: &str) -> Result<Option<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn paragraphs(document: &Html, css: &str) -> Result<Vec<String>> {
    let sel = selector(css)?;
    Ok(document
        .select(&sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect())
}

fn publish_date(document: &Html) -> Result<Option<DateTime<Utc>>> {
    let raw = match meta_content(document, "article:published_time")? {
        Some(raw) => Some(raw),
        None => {
            let sel = selector("time[datetime]")?;
            document
                .select(&sel)
                .next()
                .and_then(|el| el.value().attr("datetime"))
                .map(|s| s.to_string())
        }
    };
    Ok(raw
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|d| d.with_timezone(&Utc)))
}

fn parse_article(url: &str, body: &str) -> Result<Article> {
    let document = Html::parse_document(body);

    let title = match meta_content(&document, "og:title")? {
        Some(title) => title,
        None => first_text(&document, "title")?
            .ok_or_else(|| Error::Extraction(format!("{} has no title", url)))?,
    };

    let mut body_paragraphs = paragraphs(&document, "article p")?;
    if body_paragraphs.is_empty() {
        body_paragraphs = paragraphs(&document, "p")?;
    }
    if body_paragraphs.is_empty() {
        return Err(Error::Extraction(format!(
            "{} has no readable paragraphs",
            url
        )));
    }

    // Pages without a parseable timestamp are treated as published now,
    // which keeps them visible under today's date filter.
    let publish_date = publish_date(&document)?.unwrap_or_else(Utc::now);

    Ok(Article {
        url: url.to_string(),
        title,
        content: body_paragraphs.join("\n\n"),
        publish_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
        <html><head>
          <title>Fallback Title | Site</title>
          <meta property="og:title" content="Quake Shakes Capital" />
          <meta property="article:published_time" content="2024-03-01T08:30:00+00:00" />
        </head><body>
          <article>
            <p>A strong earthquake struck early on Friday.</p>
            <p>  </p>
            <p>Officials reported no casualties.</p>
          </article>
          <p>Unrelated footer text.</p>
        </body></html>"#;

    #[test]
    fn prefers_opengraph_title_and_article_body() {
        let article = parse_article("https://example.com/quake", PAGE).unwrap();
        assert_eq!(article.title, "Quake Shakes Capital");
        assert_eq!(
            article.content,
            "A strong earthquake struck early on Friday.\n\nOfficials reported no casualties."
        );
        assert_eq!(
            article.publish_date.to_rfc3339(),
            "2024-03-01T08:30:00+00:00"
        );
    }

    #[test]
    fn falls_back_to_title_tag_and_loose_paragraphs() {
        let body = r#"<html><head><title>Plain Title</title></head>
            <body><p>Only loose paragraphs here.</p></body></html>"#;
        let article = parse_article("https://example.com/plain", body).unwrap();
        assert_eq!(article.title, "Plain Title");
        assert_eq!(article.content, "Only loose paragraphs here.");
    }

    #[test]
    fn missing_timestamp_defaults_to_now() {
        let body = r#"<html><head><title>No Date</title></head>
            <body><p>Body.</p></body></html>"#;
        let before = Utc::now();
        let article = parse_article("https://example.com/nodate", body).unwrap();
        assert!(article.publish_date >= before);
    }

    #[test]
    fn empty_page_is_an_error() {
        let body = "<html><head><title>Empty</title></head><body></body></html>";
        let err = parse_article("https://example.com/empty", body).unwrap_err();
        assert!(matches!(err, Error::Extraction(_)));
    }
}
