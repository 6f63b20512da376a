use serde::{Deserialize, Serialize};
use serde_json::Value;
use super::lenient::{any_as_text, any_as_text_opt, null_as_empty};

/// Sentinel `next_command` value signalling the run is finished.
pub const COMPLETE_SENTINEL: &str = "COMPLETE";

/// One oracle response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Decision {
    /// Advisory only; never consumed by control logic.
    #[serde(default, deserialize_with = "any_as_text")]
    pub analysis: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub next_command: String,
    /// Kept untyped until the loop validates it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_state: Option<Value>,
    #[serde(default, deserialize_with = "any_as_text_opt")]
    pub final_report: Option<String>,
}

/// What the loop should do with a decision's `next_command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep<'a> {
    Complete,
    Empty,
    Command(&'a str),
}

impl Decision {
    pub fn next_step(&self) -> NextStep<'_> {
        let command = self.next_command.trim();
        if command == COMPLETE_SENTINEL {
            NextStep::Complete
        } else if command.is_empty() {
            NextStep::Empty
        } else {
            NextStep::Command(command)
        }
    }

    /// The final report, if the oracle provided a non-blank one.
    pub fn report(&self) -> Option<&str> {
        self.final_report
            .as_deref()
            .filter(|r| !r.trim().is_empty())
    }
}
