use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};
use crate::errors::CooError;
use crate::models::state::PentestState;
use super::utils::atomic_write;
use chrono::Utc;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RunStats {
    pub run_id: String,
    pub started_at: String,
    pub updated_at: String,
    pub iteration: u32,
    pub commands_executed: u32,
    pub ports_discovered: usize,
    pub vulnerabilities_found: usize,
    pub directories_found: usize,
    pub current_phase: String,
}

/// Keeps `run_stats.json` current so an outside observer can follow a run.
pub struct StatsTracker {
    path: PathBuf,
    data: RunStats,
}

impl StatsTracker {
    pub fn new(base_dir: &Path, run_id: &str) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            path: base_dir.join("run_stats.json"),
            data: RunStats {
                run_id: run_id.to_string(),
                started_at: now.clone(),
                updated_at: now,
                current_phase: "init".to_string(),
                ..Default::default()
            },
        }
    }

    pub fn record_state(&mut self, state: &PentestState) {
        self.data.ports_discovered = state.open_ports.len();
        self.data.vulnerabilities_found = state.vulnerabilities.len();
        self.data.directories_found = state.web_directories.len();
    }

    pub fn record_iteration(&mut self, iteration: u32, commands_executed: u32, phase: &str) {
        self.data.iteration = iteration;
        self.data.commands_executed = commands_executed;
        self.data.current_phase = phase.to_string();
    }

    pub fn stats(&self) -> &RunStats {
        &self.data
    }

    pub async fn save(&mut self) -> Result<(), CooError> {
        self.data.updated_at = Utc::now().to_rfc3339();
        let json = serde_json::to_string_pretty(&self.data)?;
        atomic_write(&self.path, &json).await
    }
}
