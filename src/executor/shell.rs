use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use async_trait::async_trait;
use chrono::Utc;
use tokio::process::Command;
use crate::config::credentials::redact_command;
use crate::models::execution::{ExecutionRecord, ExecutionResult};
use super::transcript::TranscriptWriter;
use super::ToolExecutor;
use tracing::{debug, info, warn};

/// Runs oracle-proposed commands through the platform shell, one at a time.
pub struct ShellExecutor {
    transcripts: TranscriptWriter,
    sequence: u32,
}

impl ShellExecutor {
    pub fn new(output_dir: &Path) -> Self {
        Self {
            transcripts: TranscriptWriter::new(output_dir),
            sequence: 0,
        }
    }

    fn shell_command(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.args(["/C", command]);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.args(["-c", command]);
            cmd
        }
    }

    /// Spawn, wait with a hard timeout, and collect both streams.
    pub async fn run(command: &str, timeout: Duration) -> ExecutionResult {
        let mut cmd = Self::shell_command(command);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return ExecutionResult::LaunchFailed { reason: e.to_string() },
        };

        // Dropping the wait future on timeout drops the child, which kills it.
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => ExecutionResult::Completed {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            },
            Ok(Err(e)) => ExecutionResult::LaunchFailed { reason: e.to_string() },
            Err(_) => ExecutionResult::TimedOut { elapsed: timeout },
        }
    }
}

#[async_trait]
impl ToolExecutor for ShellExecutor {
    async fn execute(&mut self, command: &str, timeout: Duration) -> ExecutionRecord {
        self.sequence += 1;
        let sequence = self.sequence;
        let started_at = Utc::now();

        if let Err(e) = self.transcripts.write_command(sequence, started_at, command).await {
            warn!(sequence, error = %e, "Failed to write command transcript");
        }

        info!(
            sequence,
            command = %redact_command(command),
            timeout_secs = timeout.as_secs(),
            "Executing command"
        );

        let start = Instant::now();
        let result = Self::run(command, timeout).await;
        let duration = start.elapsed();
        let output = result.render();

        match &result {
            ExecutionResult::Completed { exit_code, .. } => {
                info!(sequence, exit_code = ?exit_code, duration_ms = duration.as_millis() as u64, "Command completed");
            }
            ExecutionResult::TimedOut { elapsed } => {
                warn!(sequence, timeout_secs = elapsed.as_secs(), "Command timed out");
            }
            ExecutionResult::LaunchFailed { reason } => {
                warn!(sequence, reason = %reason, "Command failed to launch");
            }
        }
        debug!(sequence, bytes = output.len(), "Captured tool output");

        if let Err(e) = self.transcripts.write_output(sequence, &output).await {
            warn!(sequence, error = %e, "Failed to write output transcript");
        }

        ExecutionRecord {
            sequence,
            command: command.to_string(),
            started_at,
            duration,
            result,
        }
    }

    fn executed(&self) -> u32 {
        self.sequence
    }
}
