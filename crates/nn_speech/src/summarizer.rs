use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use nn_core::{Error, Result, Summarizer};

const SYSTEM_PROMPT: &str = "You are a helpful assistant who summarizes news articles. \
You output a concise yet comprehensive summary of the given article(s), with no added comments.";

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: String,
}

/// Summarizer backed by OpenRouter's OpenAI-style chat completions endpoint.
pub struct OpenRouterSummarizer {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterSummarizer {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://openrouter.ai/api/v1".to_string(),
        }
    }
}

impl fmt::Debug for OpenRouterSummarizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenRouterSummarizer")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Settings carry model ids in litellm style ("openrouter/google/..."); the
/// routing prefix is not part of the OpenRouter model id.
fn normalize_model(model: &str) -> &str {
    model.strip_prefix("openrouter/").unwrap_or(model)
}

#[async_trait]
impl Summarizer for OpenRouterSummarizer {
    fn name(&self) -> &str {
        "openrouter"
    }

    async fn summarize(&self, text: &str, model: &str) -> Result<String> {
        let request = ChatRequest {
            model: normalize_model(model).to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: text.to_string(),
                },
            ],
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Summarization(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Summarization(format!(
                "summarizer returned HTTP {}",
                status
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Summarization(e.to_string()))?;
        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Summarization("no choices in response".to_string()))?;
        Ok(choice.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn litellm_routing_prefix_is_stripped() {
        assert_eq!(
            normalize_model("openrouter/google/gemini-flash-1.5"),
            "google/gemini-flash-1.5"
        );
        assert_eq!(normalize_model("google/gemini-flash-1.5"), "google/gemini-flash-1.5");
    }

    #[test]
    fn debug_redacts_the_api_key() {
        let summarizer = OpenRouterSummarizer::new("sk-secret".to_string());
        let rendered = format!("{:?}", summarizer);
        assert!(!rendered.contains("sk-secret"));
    }
}
