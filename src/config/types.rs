use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Shape of the optional YAML configuration file. Every field is optional;
/// CLI flags fill in or override what the file leaves out.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CooConfig {
    pub llm: Option<LLMConfig>,
    pub run: Option<RunConfig>,
    pub tools: Option<BTreeMap<String, ToolConfig>>,
    pub output: Option<OutputConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LLMConfig {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RunConfig {
    pub max_iterations: Option<u32>,
    pub command_timeout_secs: Option<u64>,
    pub iteration_delay_secs: Option<u64>,
    pub rate_limit_backoff_secs: Option<u64>,
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
pub struct ToolConfig {
    pub binary: Option<String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct OutputConfig {
    pub directory: Option<String>,
}

pub const DEFAULT_MAX_ITERATIONS: u32 = 50;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_ITERATION_DELAY_SECS: u64 = 3;
pub const DEFAULT_RATE_LIMIT_BACKOFF_SECS: u64 = 30;
pub const DEFAULT_MAX_RETRIES: u32 = 1;
pub const DEFAULT_OUTPUT_DIR: &str = "pentest_results";

/// Tools the oracle is told about, with their usual wall-clock budgets.
pub fn default_tools() -> BTreeMap<String, ToolConfig> {
    [
        ("nmap", 300),
        ("gobuster", 600),
        ("nikto", 300),
        ("whatweb", 120),
        ("sqlmap", 600),
        ("searchsploit", 60),
        ("dirb", 300),
    ]
    .into_iter()
    .map(|(name, timeout)| {
        (name.to_string(), ToolConfig { binary: Some(name.to_string()), timeout_secs: Some(timeout) })
    })
    .collect()
}

impl CooConfig {
    /// Default tool table with file entries layered on top.
    pub fn tool_table(&self) -> BTreeMap<String, ToolConfig> {
        let mut tools = default_tools();
        if let Some(overrides) = &self.tools {
            for (name, cfg) in overrides {
                let entry = tools.entry(name.clone()).or_default();
                if cfg.binary.is_some() {
                    entry.binary = cfg.binary.clone();
                }
                if cfg.timeout_secs.is_some() {
                    entry.timeout_secs = cfg.timeout_secs;
                }
            }
        }
        tools
    }
}
