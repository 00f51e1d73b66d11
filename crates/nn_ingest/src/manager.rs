use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use nn_core::{
    Article, ArticleExtractor, Error, FeedFetcher, NewSummary, RecordStore, Result, Settings,
    SpeechSynthesizer, Summarizer,
};
use nn_speech::SpeechRouter;

use crate::sources::collect_entry_urls;

const EXTRACTION_CONCURRENCY: usize = 8;

/// Orchestrates one processing pass: discover article URLs from the
/// configured feeds, extract the ones not yet stored, then summarize and
/// narrate every stored article that still lacks a summary.
///
/// Failures are isolated per unit of work. A broken feed, an unreachable
/// page or a provider error is logged and skipped; only storage failures
/// abort the pass.
pub struct Pipeline {
    store: Arc<dyn RecordStore>,
    feeds: Arc<dyn FeedFetcher>,
    extractor: Arc<dyn ArticleExtractor>,
    summarizer: Arc<dyn Summarizer>,
    speech: Arc<SpeechRouter>,
    audio_dir: PathBuf,
    semaphore: Arc<Semaphore>,
}

impl Pipeline {
    pub fn new(
        store: Arc<dyn RecordStore>,
        feeds: Arc<dyn FeedFetcher>,
        extractor: Arc<dyn ArticleExtractor>,
        summarizer: Arc<dyn Summarizer>,
        speech: Arc<SpeechRouter>,
        audio_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            feeds,
            extractor,
            summarizer,
            speech,
            audio_dir: audio_dir.into(),
            semaphore: Arc::new(Semaphore::new(EXTRACTION_CONCURRENCY)),
        }
    }

    pub fn audio_dir(&self) -> &Path {
        &self.audio_dir
    }

    /// Run one full pass. Returns how many articles were fully enriched,
    /// meaning summarized, narrated and recorded.
    pub async fn run_pass(&self) -> Result<usize> {
        let settings = self.store.ensure_default_settings().await?;
        tokio::fs::create_dir_all(&self.audio_dir).await?;

        self.ingest_new_articles(&settings).await?;

        let pending = self.store.unsummarized_articles().await?;
        info!("📝 {} articles awaiting enrichment", pending.len());

        let synthesizer = self.speech.provider(settings.tts_provider)?;
        let mut enriched = 0;
        for article in &pending {
            if self.enrich_article(article, &settings, synthesizer.as_ref()).await? {
                enriched += 1;
            }
        }

        info!("✅ Pass complete: {} articles enriched", enriched);
        Ok(enriched)
    }

    async fn ingest_new_articles(&self, settings: &Settings) -> Result<()> {
        let discovered = collect_entry_urls(self.feeds.as_ref(), &settings.rss_feeds).await;
        let known = self.store.existing_urls().await?;
        let total = discovered.len();
        let fresh: Vec<String> = discovered
            .into_iter()
            .filter(|u| !known.contains(u))
            .collect();
        info!("🔗 {} URLs discovered, {} new", total, fresh.len());

        let extractions = fresh.iter().map(|url| {
            let extractor = self.extractor.clone();
            let semaphore = self.semaphore.clone();
            async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| Error::External(e.into()))?;
                extractor.extract(url).await
            }
        });

        // Results come back in discovery order, so sequential upserts keep
        // the store's processing order stable.
        for (url, result) in fresh.iter().zip(join_all(extractions).await) {
            match result {
                Ok(article) => self.store.upsert_article(&article).await?,
                Err(err) => warn!("⚠️ Skipping {}: {}", url, err),
            }
        }
        Ok(())
    }

    async fn enrich_article(
        &self,
        article: &Article,
        settings: &Settings,
        synthesizer: &dyn SpeechSynthesizer,
    ) -> Result<bool> {
        info!("🤖 Summarizing: {}", article.title);
        let summary = match self
            .summarizer
            .summarize(&article.content, &settings.summarizer_model)
            .await
        {
            Ok(summary) => summary,
            Err(err) => {
                warn!("⚠️ Summarization failed for {}: {}", article.url, err);
                return Ok(false);
            }
        };

        info!("🔊 Narrating: {}", article.title);
        let audio = match synthesizer
            .synthesize(&summary, &settings.voice, settings.tts_model())
            .await
        {
            Ok(audio) => audio,
            Err(err) => {
                warn!("⚠️ Synthesis failed for {}: {}", article.url, err);
                return Ok(false);
            }
        };

        let filename = audio_filename(&article.title);
        let path = self.audio_dir.join(&filename);
        write_atomic(&path, &audio).await?;

        let record = NewSummary {
            summary,
            audio_path: format!("/audio/{}", filename),
        };
        if let Err(err) = self.store.upsert_summary(&article.url, &record).await {
            // The summary row is the source of truth; an audio file without
            // one would never be served, so drop it.
            let _ = tokio::fs::remove_file(&path).await;
            return Err(err);
        }

        info!("💾 Enriched: {}", article.title);
        Ok(true)
    }
}

/// Write the audio bytes next to the target path, then rename into place,
/// so a crash mid-write never leaves a half-written file at the served path.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("mp3.tmp");
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn audio_filename(title: &str) -> String {
    format!(
        "{}_{}.mp3",
        sanitize_title(title),
        Utc::now().format("%Y%m%d%H%M%S")
    )
}

/// Reduce a headline to a safe filename stem: ASCII alphanumerics kept,
/// everything else collapsed into single underscores, capped at 80 chars.
fn sanitize_title(title: &str) -> String {
    let mut stem = String::with_capacity(title.len().min(80));
    let mut gap = false;
    for c in title.chars() {
        if stem.len() >= 80 {
            break;
        }
        if c.is_ascii_alphanumeric() {
            stem.push(c);
            gap = false;
        } else if !gap {
            stem.push('_');
            gap = true;
        }
    }
    let stem = stem.trim_matches('_');
    if stem.is_empty() {
        "article".to_string()
    } else {
        stem.to_string()
    }
}
