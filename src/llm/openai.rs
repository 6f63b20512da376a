use std::time::Duration;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use crate::errors::OracleError;
use super::provider::LLMProvider;
use super::types::{LLMResponse, Message, TokenUsage};
use crate::utils::truncation::truncate_error;
use tracing::{debug, warn};

/// Chat-completions client for any OpenAI-compatible endpoint (Groq, OpenAI,
/// OpenRouter, Ollama).
pub struct OpenAIProvider {
    client: Client,
    provider: String,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: Option<String>,
}

impl OpenAIProvider {
    pub fn new(
        provider: &str,
        api_key: &str,
        model: &str,
        base_url: &str,
        request_timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| OracleError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            provider: provider.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: 0.1,
            max_tokens: 2048,
        })
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<LLMResponse, OracleError> {
        let mut messages = Vec::new();
        if let Some(sys) = system {
            messages.push(Message::system(sys));
        }
        messages.push(Message::user(prompt));

        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let mut request = self.client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| OracleError::Network(format!("{} request failed: {}", self.provider, e)))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(OracleError::RateLimited(format!("{} returned 429 Too Many Requests", self.provider)));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(OracleError::Authentication(format!("{} rejected the API key ({})", self.provider, status)));
        }

        let text = resp.text().await
            .map_err(|e| OracleError::Network(format!("Failed to read {} response: {}", self.provider, e)))?;

        if !status.is_success() {
            return Err(OracleError::Api(format!(
                "{} returned {}: {}",
                self.provider,
                status,
                truncate_error(&text),
            )));
        }

        let envelope: ChatCompletion = serde_json::from_str(&text)
            .map_err(|e| OracleError::Api(format!("Failed to parse {} envelope: {}", self.provider, e)))?;

        if let Some(error) = envelope.error {
            return Err(OracleError::Api(error.message.unwrap_or_else(|| "Unknown".to_string())));
        }

        let choice = envelope.choices.into_iter().next()
            .ok_or_else(|| OracleError::Api(format!("{} returned no choices", self.provider)))?;
        let content = choice.message.content
            .ok_or_else(|| OracleError::Api(format!("No content in {} response", self.provider)))?;
        let usage = envelope.usage.unwrap_or_default();

        debug!(
            provider = %self.provider,
            chars = content.len(),
            input_tokens = ?usage.input,
            output_tokens = ?usage.output,
            "Completion received"
        );

        let response = LLMResponse {
            content,
            model: envelope.model.unwrap_or_else(|| self.model.clone()),
            usage,
            finish_reason: choice.finish_reason,
        };
        if response.truncated() {
            warn!(provider = %self.provider, max_tokens = self.max_tokens, "Completion hit the token limit");
        }
        Ok(response)
    }

    fn provider_name(&self) -> &str { &self.provider }
    fn model_name(&self) -> &str { &self.model }
}
