use std::collections::HashMap;
use std::sync::Arc;

use nn_core::{Error, Result, SpeechSynthesizer, TtsProvider};

use crate::Credentials;

pub mod dummy;
pub mod elevenlabs;
pub mod neets;

pub use dummy::DummySpeech;
pub use elevenlabs::ElevenLabsSpeech;
pub use neets::NeetsSpeech;

/// Dispatches synthesize calls to the provider selected in Settings.
/// Providers are registered per [`TtsProvider`] variant; adding a vendor
/// means adding a variant and a registration, not branching on strings.
pub struct SpeechRouter {
    providers: HashMap<TtsProvider, Arc<dyn SpeechSynthesizer>>,
}

impl SpeechRouter {
    /// Register every provider whose credentials are present. The dummy
    /// provider is always available for offline runs.
    pub fn from_credentials(credentials: &Credentials) -> Self {
        let mut providers: HashMap<TtsProvider, Arc<dyn SpeechSynthesizer>> = HashMap::new();
        if let Some(key) = &credentials.eleven_api_key {
            providers.insert(
                TtsProvider::ElevenLabs,
                Arc::new(ElevenLabsSpeech::new(key.clone())),
            );
        }
        if let Some(key) = &credentials.neets_api_key {
            providers.insert(TtsProvider::Neets, Arc::new(NeetsSpeech::new(key.clone())));
        }
        providers.insert(TtsProvider::Dummy, Arc::new(DummySpeech));
        Self { providers }
    }

    pub fn with_provider(
        mut self,
        provider: TtsProvider,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        self.providers.insert(provider, synthesizer);
        self
    }

    pub fn provider(&self, provider: TtsProvider) -> Result<Arc<dyn SpeechSynthesizer>> {
        self.providers.get(&provider).cloned().ok_or_else(|| {
            Error::Configuration(format!(
                "no credentials configured for TTS provider {}",
                provider
            ))
        })
    }
}
