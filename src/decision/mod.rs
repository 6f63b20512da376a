pub mod client;
pub mod parse;

use async_trait::async_trait;
use crate::errors::OracleError;
use crate::models::decision::Decision;
use crate::models::state::PentestState;

pub use client::DecisionClient;
pub use parse::parse_decision;

/// Anything that can turn the current state and last tool output into the
/// next decision.
#[async_trait]
pub trait DecisionSource: Send + Sync {
    async fn decide(&self, state: &PentestState, last_output: &str) -> Result<Decision, OracleError>;
}
