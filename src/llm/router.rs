use std::time::Duration;
use crate::errors::CooError;
use super::provider::LLMProvider;
use super::openai::OpenAIProvider;
use super::catalog;

/// Everything needed to reach one oracle endpoint.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub provider: String,
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
}

pub fn create_provider(settings: &ProviderSettings) -> Result<Box<dyn LLMProvider>, CooError> {
    let info = catalog::get_provider(&settings.provider)
        .ok_or_else(|| CooError::Config(format!("Unknown LLM provider: {}", settings.provider)))?;

    if settings.api_key.is_empty() && !catalog::key_optional(info.id) {
        return Err(CooError::Authentication(format!(
            "No API key for {} (set {} or pass --api-key)",
            info.name, info.env_var
        )));
    }

    let model = settings.model.as_deref().unwrap_or(info.default_model);
    let base_url = settings.base_url.as_deref().unwrap_or(info.base_url);

    let provider = OpenAIProvider::new(info.id, &settings.api_key, model, base_url, settings.request_timeout)?
        .with_sampling(settings.temperature, settings.max_tokens);
    Ok(Box::new(provider))
}
