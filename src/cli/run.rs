use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::cli::commands::RunArgs;
use crate::cli::display;
use crate::config::credentials::{resolve_api_key, SAVED_KEY_FILE};
use crate::config::{self, CooConfig, DEFAULT_OUTPUT_DIR, DEFAULT_RATE_LIMIT_BACKOFF_SECS, DEFAULT_MAX_RETRIES};
use crate::decision::DecisionClient;
use crate::errors::{CooError, RetryConfig};
use crate::executor::ShellExecutor;
use crate::llm::catalog::{self, DEFAULT_PROVIDER};
use crate::llm::provider::LLMProvider;
use crate::llm::{create_provider, ProviderSettings};
use crate::pipeline::{Orchestrator, OrchestratorConfig};
use crate::prompts::system_directive;
use tracing::{info, warn};

const DEFAULT_TEMPERATURE: f32 = 0.1;
const DEFAULT_MAX_TOKENS: u32 = 2048;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Everything resolved from flags, the config file and the environment.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub orchestrator: OrchestratorConfig,
    pub provider: ProviderSettings,
    pub retry: RetryConfig,
}

/// Runs the assessment and returns the process exit code for its outcome.
pub async fn handle_run(args: RunArgs) -> Result<i32, CooError> {
    let target = validate_target(&args.target)?;

    let file_config = match &args.config {
        Some(path) => config::parse_config(&PathBuf::from(path)).await?,
        None => CooConfig::default(),
    };
    let settings = build_run_settings(&args, &file_config, Path::new(SAVED_KEY_FILE))?;

    let llm: Arc<dyn LLMProvider> = Arc::from(create_provider(&settings.provider)?);
    info!(
        target = %target,
        provider = llm.provider_name(),
        model = llm.model_name(),
        "Starting assessment"
    );

    let tools: Vec<String> = file_config.tool_table().into_keys().collect();
    let directive = system_directive(&tools);
    let decider = DecisionClient::new(llm, directive, settings.retry.clone());
    let executor = ShellExecutor::new(&settings.orchestrator.output_dir);

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, stopping run");
            signal_token.cancel();
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(display::render_events(rx));

    let mut orchestrator = Orchestrator::new(settings.orchestrator, Box::new(decider), Box::new(executor))
        .with_cancel_token(cancel)
        .with_event_channel(tx);
    let summary = orchestrator.run().await?;
    drop(orchestrator);
    let _ = renderer.await;

    display::print_summary(&summary);
    Ok(summary.exit_code())
}

pub fn validate_target(target: &str) -> Result<IpAddr, CooError> {
    target
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| CooError::InvalidTarget(format!("'{}' is not a valid IP address", target)))
}

/// Layer CLI flags over the config file over built-in defaults.
pub fn build_run_settings(
    args: &RunArgs,
    file: &CooConfig,
    saved_key_path: &Path,
) -> Result<RunSettings, CooError> {
    let llm = file.llm.clone().unwrap_or_default();
    let run = file.run.clone().unwrap_or_default();

    let provider = args.provider.clone()
        .or(llm.provider)
        .unwrap_or_else(|| DEFAULT_PROVIDER.to_string());
    let info = catalog::get_provider(&provider)
        .ok_or_else(|| CooError::Config(format!("Unknown LLM provider: {}", provider)))?;

    let api_key = resolve_api_key(
        args.api_key.as_deref(),
        llm.api_key.as_deref(),
        info.env_var,
        saved_key_path,
    );
    if api_key.is_none() && !catalog::key_optional(info.id) {
        return Err(CooError::Authentication(format!(
            "No API key for {}: pass --api-key, set {}, or run `coo save-api-key`",
            info.name, info.env_var
        )));
    }

    let output_dir = args.output_dir.clone()
        .or_else(|| file.output.as_ref().and_then(|o| o.directory.clone()))
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());

    let mut orchestrator = OrchestratorConfig::new(args.target.trim(), Path::new(&output_dir))
        .with_tools(&file.tool_table());
    if let Some(max) = args.max_iterations.or(run.max_iterations) {
        orchestrator.max_iterations = max;
    }
    if let Some(secs) = args.command_timeout.or(run.command_timeout_secs) {
        orchestrator.command_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.delay.or(run.iteration_delay_secs) {
        orchestrator.iteration_delay = Duration::from_secs(secs);
    }
    if orchestrator.max_iterations == 0 {
        return Err(CooError::Config("max iterations must be at least 1".into()));
    }
    if orchestrator.command_timeout.is_zero() {
        return Err(CooError::Config("command timeout must be at least 1 second".into()));
    }

    Ok(RunSettings {
        orchestrator,
        provider: ProviderSettings {
            provider: info.id.to_string(),
            api_key: api_key.unwrap_or_default(),
            model: args.model.clone().or(llm.model),
            base_url: args.base_url.clone().or(llm.base_url),
            temperature: llm.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: llm.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            request_timeout: Duration::from_secs(
                llm.request_timeout_secs.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        },
        retry: RetryConfig {
            max_retries: run.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            rate_limit_backoff: Duration::from_secs(
                run.rate_limit_backoff_secs.unwrap_or(DEFAULT_RATE_LIMIT_BACKOFF_SECS),
            ),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config_str;
    use tempfile::TempDir;

    fn args(target: &str) -> RunArgs {
        RunArgs { target: target.to_string(), ..Default::default() }
    }

    fn no_saved_key() -> PathBuf {
        PathBuf::from("/nonexistent/groq_config.json")
    }

    #[test]
    fn test_validate_target() {
        assert!(validate_target("10.0.0.1").is_ok());
        assert!(validate_target(" 127.0.0.1 ").is_ok());
        assert!(validate_target("::1").is_ok());
        assert!(matches!(validate_target("example.com"), Err(CooError::InvalidTarget(_))));
        assert!(matches!(validate_target("10.0.0.256"), Err(CooError::InvalidTarget(_))));
        assert!(matches!(validate_target(""), Err(CooError::InvalidTarget(_))));
    }

    #[test]
    fn test_defaults_with_flag_key() {
        let mut a = args("10.0.0.1");
        a.api_key = Some("gsk_flag".into());
        let settings = build_run_settings(&a, &CooConfig::default(), &no_saved_key()).unwrap();

        assert_eq!(settings.provider.provider, "groq");
        assert_eq!(settings.provider.api_key, "gsk_flag");
        assert_eq!(settings.orchestrator.max_iterations, 50);
        assert_eq!(settings.orchestrator.command_timeout, Duration::from_secs(300));
        assert_eq!(settings.orchestrator.iteration_delay, Duration::from_secs(3));
        assert_eq!(settings.orchestrator.output_dir, PathBuf::from("pentest_results"));
        assert_eq!(settings.retry.max_retries, 1);
        assert_eq!(settings.retry.rate_limit_backoff, Duration::from_secs(30));
        assert_eq!(settings.orchestrator.timeout_for("nikto -h x"), Duration::from_secs(300));
    }

    #[test]
    fn test_flags_override_file() {
        let file = parse_config_str(
            "llm:\n  provider: openai\n  api_key: sk-file\n  model: gpt-4o-mini\nrun:\n  max_iterations: 20\n  iteration_delay_secs: 1\n",
        ).unwrap();
        let mut a = args("10.0.0.1");
        a.max_iterations = Some(7);
        let settings = build_run_settings(&a, &file, &no_saved_key()).unwrap();

        assert_eq!(settings.provider.provider, "openai");
        assert_eq!(settings.provider.api_key, "sk-file");
        assert_eq!(settings.provider.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(settings.orchestrator.max_iterations, 7);
        assert_eq!(settings.orchestrator.iteration_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_saved_key_is_last_resort() {
        let dir = TempDir::new().unwrap();
        let saved = dir.path().join(SAVED_KEY_FILE);
        std::fs::write(&saved, r#"{"api_key": "gsk_saved"}"#).unwrap();
        let file = parse_config_str("llm:\n  provider: openrouter\n").unwrap();
        // OPENROUTER_API_KEY is not expected in the test environment.
        if std::env::var("OPENROUTER_API_KEY").is_ok() {
            return;
        }
        let settings = build_run_settings(&args("10.0.0.1"), &file, &saved).unwrap();
        assert_eq!(settings.provider.api_key, "gsk_saved");
    }

    #[test]
    fn test_local_provider_needs_no_key() {
        let mut a = args("127.0.0.1");
        a.provider = Some("local".into());
        let settings = build_run_settings(&a, &CooConfig::default(), &no_saved_key()).unwrap();
        assert!(settings.provider.api_key.is_empty());
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let mut a = args("10.0.0.1");
        a.provider = Some("nope".into());
        a.api_key = Some("k".into());
        assert!(matches!(
            build_run_settings(&a, &CooConfig::default(), &no_saved_key()),
            Err(CooError::Config(_))
        ));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let mut a = args("10.0.0.1");
        a.api_key = Some("k".into());
        a.max_iterations = Some(0);
        assert!(matches!(
            build_run_settings(&a, &CooConfig::default(), &no_saved_key()),
            Err(CooError::Config(_))
        ));
    }
}
