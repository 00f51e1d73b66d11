use async_trait::async_trait;

use crate::types::{Article, Voice};
use crate::Result;

/// Turns one feed URL into the list of article URLs it advertises.
#[async_trait]
pub trait FeedFetcher: Send + Sync {
    async fn entry_urls(&self, feed_url: &str) -> Result<Vec<String>>;
}

/// Turns an article URL into a structured [`Article`].
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<Article>;
}

/// Language-model summarization capability.
#[async_trait]
pub trait Summarizer: Send + Sync {
    fn name(&self) -> &str;

    async fn summarize(&self, text: &str, model: &str) -> Result<String>;
}

/// A pluggable TTS vendor.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Render `text` to audio bytes with the given voice. `model` is only
    /// meaningful for providers that expose model selection.
    async fn synthesize(&self, text: &str, voice_id: &str, model: Option<&str>) -> Result<Vec<u8>>;

    /// List the voices this provider offers.
    async fn voices(&self) -> Result<Vec<Voice>>;
}
