// ChatCompletionSynthesizer - descriptions via an OpenAI-compatible chat completions API

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::prompt::build_prompt;
use super::provider::{AvailabilityResult, DescriptionSynthesizer, SynthesisRequest};

pub const DEFAULT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "llama-3.1-70b-versatile";
/// Default bound on one description request, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// Description synthesizer backed by any OpenAI-compatible
/// `/chat/completions` endpoint (Groq by default).
pub struct ChatCompletionSynthesizer {
    endpoint: String,
    model: String,
    api_key: String,
    max_tokens: u32,
    client: Client,
}

impl ChatCompletionSynthesizer {
    /// Build the synthesizer with a client-level request timeout.
    pub fn new(
        endpoint: String,
        model: String,
        api_key: String,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

        eprintln!(
            "Synthesizer/Chat: Initialized model={} endpoint={} timeout={}s",
            model,
            endpoint,
            timeout.as_secs()
        );

        Ok(Self {
            endpoint,
            model,
            api_key,
            max_tokens,
            client,
        })
    }
}

// ── Chat completions request/response shapes ──

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the first choice's text from a chat completions response body.
pub(crate) fn parse_completion(body: &str) -> Result<String, String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse completion response: {}", e))?;

    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        return Err("Completion response contained no text".to_string());
    }

    Ok(text)
}

#[async_trait]
impl DescriptionSynthesizer for ChatCompletionSynthesizer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn check_availability(&self) -> AvailabilityResult {
        if self.api_key.trim().is_empty() {
            return AvailabilityResult {
                available: false,
                reason: Some("API key is empty".to_string()),
            };
        }
        AvailabilityResult {
            available: true,
            reason: None,
        }
    }

    async fn describe(&self, request: &SynthesisRequest) -> Result<String, String> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage { role: "user", content: &prompt }],
            max_tokens: self.max_tokens,
        };

        let response = self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    "Completion request timed out".to_string()
                } else {
                    format!("Completion request failed: {}", e)
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("Failed to read completion response: {}", e))?;

        if !status.is_success() {
            eprintln!("Synthesizer/Chat: API error {}", status);
            return Err(format!("Completion API returned {}", status));
        }

        parse_completion(&text)
    }
}
