use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Error;

/// One extracted news article, keyed by its source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub content: String,
    pub publish_date: DateTime<Utc>,
}

/// Payload for persisting a summary once both the summarizer and the
/// synthesizer have succeeded for an article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSummary {
    pub summary: String,
    pub audio_path: String,
}

/// A stored summary joined with its owning article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub article: Article,
    pub summary: String,
    pub audio_path: String,
    pub created_at: DateTime<Utc>,
}

/// A voice offered by a TTS provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    ElevenLabs,
    Neets,
    Dummy,
}

impl TtsProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TtsProvider::ElevenLabs => "elevenlabs",
            TtsProvider::Neets => "neets",
            TtsProvider::Dummy => "dummy",
        }
    }
}

impl fmt::Display for TtsProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TtsProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "elevenlabs" => Ok(TtsProvider::ElevenLabs),
            "neets" => Ok(TtsProvider::Neets),
            "dummy" => Ok(TtsProvider::Dummy),
            other => Err(Error::Configuration(format!(
                "unknown TTS provider: {}",
                other
            ))),
        }
    }
}

/// Process-wide configuration. Field names keep the wire keys the original
/// frontend speaks (`ttsProvider`, `neetModel`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub tts_provider: TtsProvider,
    pub voice: String,
    pub neet_model: String,
    pub summarizer_model: String,
    pub rss_feeds: Vec<String>,
    pub auto_play: bool,
    pub process_interval: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tts_provider: TtsProvider::Neets,
            voice: "cardi-b".to_string(),
            neet_model: "ar-diff-50k".to_string(),
            summarizer_model: "openrouter/google/gemini-flash-1.5".to_string(),
            rss_feeds: vec!["https://www.aljazeera.com/xml/rss/all.xml".to_string()],
            auto_play: false,
            process_interval: 300,
        }
    }
}

impl Settings {
    /// The model argument forwarded to the synthesizer; only Neets selects one.
    pub fn tts_model(&self) -> Option<&str> {
        match self.tts_provider {
            TtsProvider::Neets => Some(self.neet_model.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_serialize_with_wire_keys() {
        let value = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(value["ttsProvider"], "neets");
        assert_eq!(value["voice"], "cardi-b");
        assert_eq!(value["neetModel"], "ar-diff-50k");
        assert_eq!(value["processInterval"], 300);
        assert!(value["rssFeeds"].is_array());
    }

    #[test]
    fn settings_round_trip() {
        let settings = Settings {
            tts_provider: TtsProvider::ElevenLabs,
            voice: "d39BbXcI33A814zijpKb".to_string(),
            rss_feeds: vec![
                "https://example.com/a.xml".to_string(),
                "https://example.com/b.xml".to_string(),
            ],
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn provider_parses_from_path_segment() {
        assert_eq!(
            "elevenlabs".parse::<TtsProvider>().unwrap(),
            TtsProvider::ElevenLabs
        );
        assert!("espeak".parse::<TtsProvider>().is_err());
    }

    #[test]
    fn tts_model_only_set_for_neets() {
        let mut settings = Settings::default();
        assert_eq!(settings.tts_model(), Some("ar-diff-50k"));
        settings.tts_provider = TtsProvider::ElevenLabs;
        assert_eq!(settings.tts_model(), None);
    }
}
