use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use nn_core::{Error, Result, SpeechSynthesizer, Voice};

const TTS_MODEL_ID: &str = "eleven_multilingual_v2";

#[derive(Deserialize)]
struct VoicesResponse {
    voices: Vec<ElevenVoice>,
}

#[derive(Deserialize)]
struct ElevenVoice {
    voice_id: String,
    name: String,
}

pub struct ElevenLabsSpeech {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ElevenLabsSpeech {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.elevenlabs.io/v1".to_string(),
        }
    }
}

impl fmt::Debug for ElevenLabsSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElevenLabsSpeech")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSpeech {
    fn name(&self) -> &str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, voice_id: &str, _model: Option<&str>) -> Result<Vec<u8>> {
        let body = json!({
            "text": text,
            "model_id": TTS_MODEL_ID,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.5
            }
        });

        let response = self
            .client
            .post(format!("{}/text-to-speech/{}", self.base_url, voice_id))
            .header("Accept", "audio/mpeg")
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Synthesis(format!(
                "ElevenLabs returned HTTP {}",
                status
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn voices(&self) -> Result<Vec<Voice>> {
        let response = self
            .client
            .get(format!("{}/voices", self.base_url))
            .header("xi-api-key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Synthesis(format!(
                "ElevenLabs voices returned HTTP {}",
                status
            )));
        }

        let body: VoicesResponse = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        Ok(body
            .voices
            .into_iter()
            .map(|v| Voice {
                id: v.voice_id,
                name: v.name,
                models: Vec::new(),
            })
            .collect())
    }
}
