use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::{Article, NewSummary, Settings, SummaryRecord};
use crate::Result;

/// Durable keyed storage for articles, summaries and settings.
///
/// All mutations are durable before the call returns. Upserts are
/// insert-or-replace by URL so re-running a pass is idempotent.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or fully replace the article keyed by its URL.
    async fn upsert_article(&self, article: &Article) -> Result<()>;

    /// Insert or replace the summary for `url`. Fails with
    /// [`crate::Error::MissingArticle`] when no article with that URL exists.
    async fn upsert_summary(&self, url: &str, summary: &NewSummary) -> Result<()>;

    /// All articles, optionally restricted to a UTC calendar day,
    /// newest publish date first.
    async fn get_articles(&self, filter_date: Option<NaiveDate>) -> Result<Vec<Article>>;

    /// All summaries joined with their owning article, newest first.
    async fn get_summaries(&self) -> Result<Vec<SummaryRecord>>;

    /// URLs already present in the store, used as the dedup filter.
    async fn existing_urls(&self) -> Result<HashSet<String>>;

    /// Articles that do not yet have a summary. The absence of a summary is
    /// the retry signal for the enrichment stage.
    async fn unsummarized_articles(&self) -> Result<Vec<Article>>;

    async fn get_settings(&self) -> Result<Option<Settings>>;

    /// Replace the whole settings record.
    async fn save_settings(&self, settings: &Settings) -> Result<()>;

    /// Write the built-in defaults when no settings exist yet; always returns
    /// the current settings.
    async fn ensure_default_settings(&self) -> Result<Settings>;
}
