use std::time::Duration;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Outcome of one tool command. Every variant renders to tool output, so a
/// failed or hung scan still yields data for the next decision round.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Completed {
        stdout: String,
        stderr: String,
        /// `None` when the process was terminated by a signal.
        exit_code: Option<i32>,
    },
    TimedOut {
        #[serde(with = "duration_secs")]
        elapsed: Duration,
    },
    LaunchFailed {
        reason: String,
    },
}

impl ExecutionResult {
    /// The combined text handed back to the oracle as `last_tool_output`.
    pub fn render(&self) -> String {
        match self {
            Self::Completed { stdout, stderr, exit_code } => {
                let code = exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "none (terminated by signal)".to_string());
                format!("STDOUT:\n{}\n\nSTDERR:\n{}\n\nRETURN CODE: {}", stdout, stderr, code)
            }
            Self::TimedOut { elapsed } => {
                format!("Command timed out after {} seconds", elapsed.as_secs())
            }
            Self::LaunchFailed { reason } => {
                format!("Command execution failed: {}", reason)
            }
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            Self::Completed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed { .. } => "completed",
            Self::TimedOut { .. } => "timed_out",
            Self::LaunchFailed { .. } => "launch_failed",
        }
    }
}

/// Audit trail of one command execution.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionRecord {
    /// 1-based, never reused within a run.
    pub sequence: u32,
    pub command: String,
    pub started_at: DateTime<Utc>,
    #[serde(with = "duration_secs")]
    pub duration: Duration,
    pub result: ExecutionResult,
}

impl ExecutionRecord {
    pub fn output(&self) -> String {
        self.result.render()
    }
}

mod duration_secs {
    use std::time::Duration;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }
}
