use nn_core::{Error, Result, TtsProvider};

pub mod summarizer;
pub mod tts;

pub use summarizer::OpenRouterSummarizer;
pub use tts::dummy::DummySummarizer;
pub use tts::{DummySpeech, ElevenLabsSpeech, NeetsSpeech, SpeechRouter};

/// API keys for the external providers, read from the environment once at
/// startup. A missing key for the *selected* provider is fatal before the
/// first pass runs; keys for unselected providers may be absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub eleven_api_key: Option<String>,
    pub neets_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self {
            eleven_api_key: non_empty_env("ELEVEN_API_KEY"),
            neets_api_key: non_empty_env("NEETS_API_KEY"),
            openrouter_api_key: non_empty_env("OPENROUTER_API_KEY"),
        }
    }

    pub fn require_tts(&self, provider: TtsProvider) -> Result<()> {
        let missing = match provider {
            TtsProvider::ElevenLabs => self.eleven_api_key.is_none().then_some("ELEVEN_API_KEY"),
            TtsProvider::Neets => self.neets_api_key.is_none().then_some("NEETS_API_KEY"),
            TtsProvider::Dummy => None,
        };
        match missing {
            Some(var) => Err(Error::Configuration(format!(
                "missing required {} for TTS provider {}",
                var, provider
            ))),
            None => Ok(()),
        }
    }

    pub fn require_summarizer(&self) -> Result<&str> {
        self.openrouter_api_key.as_deref().ok_or_else(|| {
            Error::Configuration(
                "missing required OPENROUTER_API_KEY for the summarizer".to_string(),
            )
        })
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

pub mod prelude {
    pub use super::{Credentials, SpeechRouter};
    pub use nn_core::{SpeechSynthesizer, Summarizer, TtsProvider};
}
