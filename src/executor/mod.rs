pub mod shell;
pub mod transcript;

use std::time::Duration;
use async_trait::async_trait;
use crate::models::execution::ExecutionRecord;

pub use shell::ShellExecutor;
pub use transcript::TranscriptWriter;

/// Runs one tool command to completion, timeout, or launch failure.
///
/// Never fails: every outcome is an `ExecutionRecord` whose rendered
/// output feeds the next decision. Implementations execute sequentially.
#[async_trait]
pub trait ToolExecutor: Send {
    async fn execute(&mut self, command: &str, timeout: Duration) -> ExecutionRecord;

    /// Number of commands executed so far (the last sequence number issued).
    fn executed(&self) -> u32;
}
