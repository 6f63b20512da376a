use std::path::{Path, PathBuf};
use chrono::{DateTime, Utc};
use crate::errors::CooError;
use crate::utils::formatting::sequence_prefix;

/// Per-command audit artifacts: `command_NNN.txt` and `output_NNN.txt`.
pub struct TranscriptWriter {
    dir: PathBuf,
}

impl TranscriptWriter {
    pub fn new(dir: &Path) -> Self {
        Self { dir: dir.to_path_buf() }
    }

    pub fn command_path(&self, sequence: u32) -> PathBuf {
        self.dir.join(format!("command_{}.txt", sequence_prefix(sequence)))
    }

    pub fn output_path(&self, sequence: u32) -> PathBuf {
        self.dir.join(format!("output_{}.txt", sequence_prefix(sequence)))
    }

    pub async fn write_command(
        &self,
        sequence: u32,
        started_at: DateTime<Utc>,
        command: &str,
    ) -> Result<(), CooError> {
        let content = format!(
            "Command #{}\nTimestamp: {}\nCommand: {}\n",
            sequence,
            started_at.to_rfc3339(),
            command,
        );
        tokio::fs::write(self.command_path(sequence), content).await?;
        Ok(())
    }

    pub async fn write_output(&self, sequence: u32, output: &str) -> Result<(), CooError> {
        tokio::fs::write(self.output_path(sequence), output).await?;
        Ok(())
    }
}
