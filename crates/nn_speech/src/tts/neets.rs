use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use nn_core::{Error, Result, SpeechSynthesizer, Voice};

const DEFAULT_MODEL: &str = "ar-diff-50k";

#[derive(Deserialize)]
struct NeetsVoice {
    id: String,
    title: String,
    #[serde(default)]
    supported_models: Vec<String>,
}

pub struct NeetsSpeech {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NeetsSpeech {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://api.neets.ai/v1".to_string(),
        }
    }
}

impl fmt::Debug for NeetsSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NeetsSpeech")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl SpeechSynthesizer for NeetsSpeech {
    fn name(&self) -> &str {
        "neets"
    }

    async fn synthesize(&self, text: &str, voice_id: &str, model: Option<&str>) -> Result<Vec<u8>> {
        let payload = json!({
            "params": { "model": model.unwrap_or(DEFAULT_MODEL) },
            "fmt": "mp3",
            "voice_id": voice_id,
            "text": text
        });

        let response = self
            .client
            .post(format!("{}/tts", self.base_url))
            .header("accept", "audio/wav")
            .header("X-API-Key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Synthesis(format!("Neets returned HTTP {}", status)));
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
            .header("accept", "application/json")
            .header("X-API-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Synthesis(format!(
                "Neets voices returned HTTP {}",
                status
            )));
        }

        let body: Vec<NeetsVoice> = response
            .json()
            .await
            .map_err(|e| Error::Synthesis(e.to_string()))?;
        Ok(body
            .into_iter()
            .map(|v| Voice {
                id: v.id,
                name: v.title,
                models: v.supported_models,
            })
            .collect())
    }
}
