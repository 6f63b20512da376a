use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use async_trait::async_trait;
use crate::errors::{OracleError, RetryConfig, with_retry};
use crate::llm::provider::LLMProvider;
use crate::models::decision::Decision;
use crate::models::state::PentestState;
use crate::prompts::build_request;
use crate::utils::truncation::truncate_error;
use super::parse::parse_decision;
use super::DecisionSource;
use tracing::{error, info};

/// Asks the oracle for the next step. Transport and parse concerns only;
/// the returned `updated_state` is not validated here.
pub struct DecisionClient {
    llm: Arc<dyn LLMProvider>,
    system_directive: String,
    retry: RetryConfig,
    calls: AtomicU32,
}

impl DecisionClient {
    pub fn new(llm: Arc<dyn LLMProvider>, system_directive: String, retry: RetryConfig) -> Self {
        Self {
            llm,
            system_directive,
            retry,
            calls: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl DecisionSource for DecisionClient {
    async fn decide(&self, state: &PentestState, last_output: &str) -> Result<Decision, OracleError> {
        let first_step = self.calls.fetch_add(1, Ordering::SeqCst) == 0;
        let prompt = build_request(state, last_output, first_step)
            .map_err(|e| OracleError::Api(format!("Failed to encode request: {}", e)))?;

        info!(oracle = %self.llm.describe(), request_bytes = prompt.len(), first_step, "Requesting decision");

        let response = with_retry("oracle_decision", &self.retry, || {
            self.llm.complete(&prompt, Some(&self.system_directive))
        }).await?;

        info!(
            chars = response.content.len(),
            input_tokens = ?response.usage.input,
            output_tokens = ?response.usage.output,
            "Received decision"
        );

        parse_decision(&response.content).inspect_err(|e| {
            error!(
                error = %e,
                raw = %truncate_error(e.raw_response().unwrap_or_default()),
                "Failed to parse oracle reply"
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use crate::llm::types::LLMResponse;
    use crate::models::decision::NextStep;

    struct ScriptedProvider {
        replies: Mutex<VecDeque<Result<String, OracleError>>>,
        prompts: Mutex<Vec<(String, Option<String>)>>,
    }

    impl ScriptedProvider {
        fn new(replies: Vec<Result<String, OracleError>>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LLMProvider for ScriptedProvider {
        async fn complete(&self, prompt: &str, system: Option<&str>) -> Result<LLMResponse, OracleError> {
            self.prompts.lock().unwrap().push((prompt.to_string(), system.map(str::to_string)));
            let next = self.replies.lock().unwrap().pop_front()
                .unwrap_or_else(|| Err(OracleError::Api("script exhausted".into())));
            next.map(|content| LLMResponse::text(content, "scripted"))
        }

        fn provider_name(&self) -> &str { "scripted" }
        fn model_name(&self) -> &str { "scripted" }
    }

    fn client(provider: Arc<ScriptedProvider>) -> DecisionClient {
        DecisionClient::new(
            provider,
            "directive".to_string(),
            RetryConfig { max_retries: 1, rate_limit_backoff: Duration::from_millis(5) },
        )
    }

    const SCAN: &str = r#"{"analysis": "start", "next_command": "nmap -F --open 10.0.0.1"}"#;

    #[tokio::test]
    async fn test_decide_sends_state_and_directive() {
        let provider = ScriptedProvider::new(vec![Ok(SCAN.into())]);
        let client = client(provider.clone());
        let decision = client.decide(&PentestState::new("10.0.0.1"), "").await.unwrap();
        assert_eq!(decision.next_step(), NextStep::Command("nmap -F --open 10.0.0.1"));

        let prompts = provider.prompts.lock().unwrap();
        let (prompt, system) = &prompts[0];
        assert_eq!(system.as_deref(), Some("directive"));
        let body: serde_json::Value = serde_json::from_str(prompt).unwrap();
        assert_eq!(body["state"]["target_ip"], "10.0.0.1");
        assert_eq!(body["last_tool_output"], "");
    }

    #[tokio::test]
    async fn test_only_first_request_carries_hint() {
        let provider = ScriptedProvider::new(vec![Ok(SCAN.into()), Ok(SCAN.into())]);
        let client = client(provider.clone());
        let state = PentestState::new("10.0.0.1");
        client.decide(&state, "").await.unwrap();
        client.decide(&state, "STDOUT:\n").await.unwrap();

        let prompts = provider.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("\"instructions\""));
        assert!(!prompts[1].0.contains("\"instructions\""));
    }

    #[tokio::test]
    async fn test_rate_limit_retried_once_then_succeeds() {
        let provider = ScriptedProvider::new(vec![
            Err(OracleError::RateLimited("429".into())),
            Ok(SCAN.into()),
        ]);
        let client = client(provider.clone());
        assert!(client.decide(&PentestState::new("10.0.0.1"), "").await.is_ok());
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_second_rate_limit_surfaces() {
        let provider = ScriptedProvider::new(vec![
            Err(OracleError::RateLimited("429".into())),
            Err(OracleError::RateLimited("429".into())),
            Ok(SCAN.into()),
        ]);
        let client = client(provider.clone());
        let err = client.decide(&PentestState::new("10.0.0.1"), "").await.unwrap_err();
        assert!(matches!(err, OracleError::RateLimited(_)));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_network_error_not_retried() {
        let provider = ScriptedProvider::new(vec![
            Err(OracleError::Network("connection refused".into())),
            Ok(SCAN.into()),
        ]);
        let client = client(provider.clone());
        assert!(matches!(
            client.decide(&PentestState::new("10.0.0.1"), "").await,
            Err(OracleError::Network(_))
        ));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_not_retried() {
        let provider = ScriptedProvider::new(vec![Ok("I cannot help with that.".into()), Ok(SCAN.into())]);
        let client = client(provider.clone());
        let err = client.decide(&PentestState::new("10.0.0.1"), "").await.unwrap_err();
        assert_eq!(err.raw_response(), Some("I cannot help with that."));
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_invalid_state_passes_through_unvalidated() {
        let provider = ScriptedProvider::new(vec![Ok(
            r#"{"next_command": "whoami", "updated_state": {"notes": "partial"}}"#.into()
        )]);
        let client = client(provider);
        let decision = client.decide(&PentestState::new("10.0.0.1"), "").await.unwrap();
        assert_eq!(decision.updated_state.unwrap()["notes"], "partial");
    }
}
