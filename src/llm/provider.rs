use async_trait::async_trait;
use crate::errors::OracleError;
use super::types::LLMResponse;

/// A chat endpoint that answers one prompt at a time. Implementations map
/// their transport failures onto `OracleError` so retry policy can classify
/// them without knowing the provider.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<LLMResponse, OracleError>;

    fn provider_name(&self) -> &str;

    fn model_name(&self) -> &str;

    /// `provider/model`, for log lines.
    fn describe(&self) -> String {
        format!("{}/{}", self.provider_name(), self.model_name())
    }
}
