use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Serialize;
use crate::config::{
    ToolConfig, DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_ITERATION_DELAY_SECS, DEFAULT_MAX_ITERATIONS,
};
use crate::models::state::PentestState;

/// Everything the loop needs, passed in explicitly.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub run_id: String,
    pub target: String,
    pub output_dir: PathBuf,
    pub max_iterations: u32,
    pub command_timeout: Duration,
    pub iteration_delay: Duration,
    /// Keyed by executable name.
    pub tool_timeouts: BTreeMap<String, Duration>,
}

impl OrchestratorConfig {
    pub fn new(target: &str, output_dir: &Path) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            target: target.to_string(),
            output_dir: output_dir.to_path_buf(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            command_timeout: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
            iteration_delay: Duration::from_secs(DEFAULT_ITERATION_DELAY_SECS),
            tool_timeouts: BTreeMap::new(),
        }
    }

    pub fn with_tools(mut self, tools: &BTreeMap<String, ToolConfig>) -> Self {
        for (name, tool) in tools {
            if let Some(secs) = tool.timeout_secs {
                self.tool_timeouts.insert(name.clone(), Duration::from_secs(secs));
            }
        }
        self
    }

    /// Timeout for a command line, looked up by the basename of its first word.
    pub fn timeout_for(&self, command: &str) -> Duration {
        command
            .split_whitespace()
            .next()
            .map(executable_name)
            .and_then(|name| self.tool_timeouts.get(name))
            .copied()
            .unwrap_or(self.command_timeout)
    }
}

fn executable_name(word: &str) -> &str {
    let base = word.rsplit(['/', '\\']).next().unwrap_or(word);
    base.strip_suffix(".exe").unwrap_or(base)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunPhase {
    Init,
    Iterating,
    Complete,
    Aborted,
    Exhausted,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Iterating => write!(f, "iterating"),
            Self::Complete => write!(f, "complete"),
            Self::Aborted => write!(f, "aborted"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbortReason {
    Oracle(String),
    EmptyCommand,
    Cancelled,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Oracle(e) => write!(f, "oracle failure: {}", e),
            Self::EmptyCommand => write!(f, "oracle returned no next command"),
            Self::Cancelled => write!(f, "interrupted"),
        }
    }
}

/// How a run ended. Terminal: nothing is issued after one is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Complete { report_path: Option<PathBuf> },
    Aborted { reason: AbortReason },
    Exhausted,
}

impl Termination {
    pub fn phase(&self) -> RunPhase {
        match self {
            Self::Complete { .. } => RunPhase::Complete,
            Self::Aborted { .. } => RunPhase::Aborted,
            Self::Exhausted => RunPhase::Exhausted,
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Aborted { .. })
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Complete { .. } | Self::Exhausted => 0,
            Self::Aborted { reason: AbortReason::Cancelled } => 130,
            Self::Aborted { .. } => 1,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Complete { .. } => write!(f, "complete"),
            Self::Aborted { reason } => write!(f, "aborted ({})", reason),
            Self::Exhausted => write!(f, "exhausted iteration limit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub termination: Termination,
    /// Decision rounds started.
    pub iterations: u32,
    pub commands_executed: u32,
    pub duration: Duration,
    pub final_state: PentestState,
}

impl RunSummary {
    pub fn exit_code(&self) -> i32 {
        self.termination.exit_code()
    }
}
