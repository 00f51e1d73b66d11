use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

use nn_core::{Article, Error, NewSummary, RecordStore, Result, Settings, SummaryRecord};

#[derive(Debug, Clone)]
struct StoredSummary {
    summary: String,
    audio_path: String,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Inner {
    // Vec keeps discovery order for unsummarized_articles.
    articles: Vec<Article>,
    summaries: HashMap<String, StoredSummary>,
    settings: Option<Settings>,
}

/// In-memory record store. Used by tests and `--storage memory` dry runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn upsert_article(&self, article: &Article) -> Result<()> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.articles.iter_mut().find(|a| a.url == article.url) {
            *existing = article.clone();
        } else {
            inner.articles.push(article.clone());
        }
        Ok(())
    }

    async fn upsert_summary(&self, url: &str, summary: &NewSummary) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.articles.iter().any(|a| a.url == url) {
            return Err(Error::MissingArticle(url.to_string()));
        }
        inner.summaries.insert(
            url.to_string(),
            StoredSummary {
                summary: summary.summary.clone(),
                audio_path: summary.audio_path.clone(),
                created_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn get_articles(&self, filter_date: Option<NaiveDate>) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        let mut articles: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| match filter_date {
                Some(day) => a.publish_date.date_naive() == day,
                None => true,
            })
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.publish_date.cmp(&a.publish_date));
        Ok(articles)
    }

    async fn get_summaries(&self) -> Result<Vec<SummaryRecord>> {
        let inner = self.inner.read().await;
        let mut records: Vec<SummaryRecord> = inner
            .articles
            .iter()
            .filter_map(|article| {
                inner.summaries.get(&article.url).map(|s| SummaryRecord {
                    article: article.clone(),
                    summary: s.summary.clone(),
                    audio_path: s.audio_path.clone(),
                    created_at: s.created_at,
                })
            })
            .collect();
        records.sort_by(|a, b| b.article.publish_date.cmp(&a.article.publish_date));
        Ok(records)
    }

    async fn existing_urls(&self) -> Result<HashSet<String>> {
        let inner = self.inner.read().await;
        Ok(inner.articles.iter().map(|a| a.url.clone()).collect())
    }

    async fn unsummarized_articles(&self) -> Result<Vec<Article>> {
        let inner = self.inner.read().await;
        Ok(inner
            .articles
            .iter()
            .filter(|a| !inner.summaries.contains_key(&a.url))
            .cloned()
            .collect())
    }

    async fn get_settings(&self) -> Result<Option<Settings>> {
        Ok(self.inner.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.inner.write().await.settings = Some(settings.clone());
        Ok(())
    }

    async fn ensure_default_settings(&self) -> Result<Settings> {
        let mut inner = self.inner.write().await;
        match &inner.settings {
            Some(settings) => Ok(settings.clone()),
            None => {
                let defaults = Settings::default();
                inner.settings = Some(defaults.clone());
                Ok(defaults)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(url: &str, day: u32) -> Article {
        Article {
            url: url.to_string(),
            title: format!("Article {}", url),
            content: "content".to_string(),
            publish_date: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).single().unwrap(),
        }
    }

    #[tokio::test]
    async fn upsert_article_is_idempotent() {
        let store = MemoryStore::new();
        let a = article("http://example.com/a", 1);
        store.upsert_article(&a).await.unwrap();
        store.upsert_article(&a).await.unwrap();
        assert_eq!(store.get_articles(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn summary_requires_article() {
        let store = MemoryStore::new();
        let summary = NewSummary {
            summary: "s".to_string(),
            audio_path: "/audio/s.mp3".to_string(),
        };
        let err = store
            .upsert_summary("http://example.com/missing", &summary)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingArticle(_)));
    }

    #[tokio::test]
    async fn unsummarized_articles_tracks_missing_summaries() {
        let store = MemoryStore::new();
        let a = article("http://example.com/a", 1);
        let b = article("http://example.com/b", 2);
        store.upsert_article(&a).await.unwrap();
        store.upsert_article(&b).await.unwrap();
        store
            .upsert_summary(
                &a.url,
                &NewSummary {
                    summary: "s".to_string(),
                    audio_path: "/audio/a.mp3".to_string(),
                },
            )
            .await
            .unwrap();

        let pending = store.unsummarized_articles().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].url, b.url);
    }
}
