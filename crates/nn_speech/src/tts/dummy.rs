use async_trait::async_trait;

use nn_core::{Result, SpeechSynthesizer, Summarizer, Voice};

/// Deterministic offline synthesizer for tests and dry runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummySpeech;

#[async_trait]
impl SpeechSynthesizer for DummySpeech {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn synthesize(&self, text: &str, voice_id: &str, _model: Option<&str>) -> Result<Vec<u8>> {
        Ok(format!("dummy-audio[{}]:{}", voice_id, text).into_bytes())
    }

    async fn voices(&self) -> Result<Vec<Voice>> {
        Ok(vec![Voice {
            id: "narrator".to_string(),
            name: "Narrator".to_string(),
            models: Vec::new(),
        }])
    }
}

/// Deterministic offline summarizer: first 20 words of the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummySummarizer;

#[async_trait]
impl Summarizer for DummySummarizer {
    fn name(&self) -> &str {
        "dummy"
    }

    async fn summarize(&self, text: &str, _model: &str) -> Result<String> {
        let words: Vec<&str> = text.split_whitespace().take(20).collect();
        Ok(words.join(" "))
    }
}
