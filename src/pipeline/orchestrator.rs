use std::path::PathBuf;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use crate::audit::utils::atomic_write;
use crate::audit::{StatsTracker, WorkflowLogger};
use crate::decision::DecisionSource;
use crate::errors::CooError;
use crate::executor::ToolExecutor;
use crate::models::decision::{Decision, NextStep};
use crate::models::state::PentestState;
use crate::session::StateStore;
use crate::config::credentials::redact_command;
use crate::utils::formatting::format_duration;
use super::events::RunEvent;
use super::state::*;
use tracing::{debug, error, info, warn};

pub const FINAL_REPORT_FILE: &str = "final_report.md";

/// Drives one run: decision, state merge, command, repeat.
///
/// Owns the canonical `PentestState` exclusively; nothing else mutates it
/// while the run is in progress.
pub struct Orchestrator {
    config: OrchestratorConfig,
    decider: Box<dyn DecisionSource>,
    executor: Box<dyn ToolExecutor>,
    state: PentestState,
    store: StateStore,
    workflow: WorkflowLogger,
    stats: StatsTracker,
    cancel_token: CancellationToken,
    event_tx: Option<mpsc::UnboundedSender<RunEvent>>,
    session_start: chrono::DateTime<chrono::Utc>,
    iteration: u32,
}

impl Orchestrator {
    pub fn new(
        config: OrchestratorConfig,
        decider: Box<dyn DecisionSource>,
        executor: Box<dyn ToolExecutor>,
    ) -> Self {
        let state = PentestState::new(&config.target);
        let store = StateStore::new(&config.output_dir);
        let workflow = WorkflowLogger::new(&config.output_dir);
        let stats = StatsTracker::new(&config.output_dir, &config.run_id);
        Self {
            config,
            decider,
            executor,
            state,
            store,
            workflow,
            stats,
            cancel_token: CancellationToken::new(),
            event_tx: None,
            session_start: chrono::Utc::now(),
            iteration: 0,
        }
    }

    /// Use an external token so a signal handler can stop the run.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel_token = token;
        self
    }

    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    fn emit(&self, event: RunEvent) {
        if let Some(ref tx) = self.event_tx {
            let _ = tx.send(event);
        }
    }

    /// Append to workflow.log; a failed write never stops the run.
    async fn log_workflow(&self, message: &str) {
        if let Err(e) = self.workflow.log_event(message).await {
            warn!(error = %e, "Failed to write workflow log");
        }
    }

    /// Run until a terminal state. Errors are reserved for setup failures;
    /// every way the loop itself can end is a `Termination`.
    pub async fn run(&mut self) -> Result<RunSummary, CooError> {
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        self.workflow.initialize(&self.config.run_id, &self.config.target).await?;
        self.session_start = chrono::Utc::now();
        let started = Instant::now();

        info!(
            run_id = %self.config.run_id,
            target = %self.config.target,
            max_iterations = self.config.max_iterations,
            output_dir = %self.config.output_dir.display(),
            "Run started"
        );
        self.emit(RunEvent::RunStarted {
            run_id: self.config.run_id.clone(),
            target: self.config.target.clone(),
            max_iterations: self.config.max_iterations,
        });
        self.stats.record_state(&self.state);
        self.save_stats(RunPhase::Init).await;
        self.persist(None).await;

        let termination = self.iterate().await;
        let duration = started.elapsed();
        let duration_ms = duration.as_millis() as u64;
        let commands_executed = self.executor.executed();

        match &termination {
            Termination::Aborted { reason } => error!(
                reason = %reason,
                iterations = self.iteration,
                commands = commands_executed,
                elapsed = %format_duration(duration_ms),
                "Run aborted"
            ),
            other => info!(
                outcome = %other,
                iterations = self.iteration,
                commands = commands_executed,
                elapsed = %format_duration(duration_ms),
                "Run finished"
            ),
        }
        self.log_workflow(&format!(
            "Run ended: {} after {} iterations ({})",
            termination,
            self.iteration,
            format_duration(duration_ms),
        )).await;
        self.save_stats(termination.phase()).await;
        self.emit(RunEvent::Terminated {
            termination: termination.clone(),
            iterations: self.iteration,
            duration_ms,
        });

        Ok(RunSummary {
            run_id: self.config.run_id.clone(),
            termination,
            iterations: self.iteration,
            commands_executed,
            duration,
            final_state: self.state.clone(),
        })
    }

    async fn iterate(&mut self) -> Termination {
        let mut last_output = String::new();

        while self.iteration < self.config.max_iterations {
            if self.cancel_token.is_cancelled() {
                return Termination::Aborted { reason: AbortReason::Cancelled };
            }
            self.iteration += 1;
            let iteration = self.iteration;
            info!(iteration, max = self.config.max_iterations, state = %self.state.summary(), "Iteration started");
            self.emit(RunEvent::IterationStarted {
                iteration,
                max_iterations: self.config.max_iterations,
            });
            self.log_workflow(&format!("Iteration {} started", iteration)).await;

            let token = self.cancel_token.clone();
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    return Termination::Aborted { reason: AbortReason::Cancelled };
                }
                outcome = self.decider.decide(&self.state, &last_output) => outcome,
            };
            let decision = match outcome {
                Ok(decision) => decision,
                Err(e) => {
                    error!(iteration, error = %e, error_type = e.classify().error_type, "Decision request failed");
                    self.log_workflow(&format!("Decision request failed: {}", e)).await;
                    return Termination::Aborted { reason: AbortReason::Oracle(e.to_string()) };
                }
            };

            debug!(iteration, analysis = %decision.analysis, "Oracle analysis");
            self.emit(RunEvent::DecisionReceived {
                iteration,
                analysis: decision.analysis.clone(),
                next_command: decision.next_command.clone(),
            });
            self.persist(Some(&decision)).await;

            if decision.next_step() == NextStep::Complete {
                info!(iteration, "Oracle signalled completion");
                self.log_workflow("Oracle signalled completion").await;
                let report_path = self.write_report(&decision).await;
                return Termination::Complete { report_path };
            }

            self.merge_state(&decision);

            let NextStep::Command(command) = decision.next_step() else {
                warn!(iteration, "Oracle returned no next command");
                self.persist(Some(&decision)).await;
                return Termination::Aborted { reason: AbortReason::EmptyCommand };
            };

            last_output = tokio::select! {
                _ = token.cancelled() => {
                    self.persist(Some(&decision)).await;
                    return Termination::Aborted { reason: AbortReason::Cancelled };
                }
                output = self.dispatch(command) => output,
            };

            self.stats.record_state(&self.state);
            self.save_stats(RunPhase::Iterating).await;
            self.persist(Some(&decision)).await;

            if self.iteration < self.config.max_iterations && !self.config.iteration_delay.is_zero() {
                tokio::select! {
                    _ = token.cancelled() => {
                        return Termination::Aborted { reason: AbortReason::Cancelled };
                    }
                    _ = tokio::time::sleep(self.config.iteration_delay) => {}
                }
            }
        }

        warn!(max = self.config.max_iterations, "Iteration limit reached");
        Termination::Exhausted
    }

    /// Full replacement, gated on validation; a rejected update leaves the
    /// prior state in place.
    fn merge_state(&mut self, decision: &Decision) {
        let Some(document) = &decision.updated_state else {
            debug!("Decision carried no state update");
            return;
        };

        match StateStore::accept(document) {
            Ok(mut next) => {
                if next.target != self.state.target {
                    warn!(
                        reported = %next.target,
                        target = %self.state.target,
                        "Oracle changed the target; keeping the original"
                    );
                    next.target = self.state.target.clone();
                }
                self.state = next;
                info!(state = %self.state.summary(), "State updated");
                self.emit(RunEvent::StateAccepted { summary: self.state.summary() });
            }
            Err(e) => {
                warn!(error = %e, "Rejected state update; keeping prior state");
                self.emit(RunEvent::StateRejected { reason: e.to_string() });
            }
        }
    }

    async fn dispatch(&mut self, command: &str) -> String {
        let timeout = self.config.timeout_for(command);
        let sequence = self.executor.executed() + 1;
        self.emit(RunEvent::CommandStarted { sequence, command: command.to_string() });
        self.log_workflow(&format!("[{}] $ {}", sequence, redact_command(command))).await;

        let record = self.executor.execute(command, timeout).await;

        info!(
            sequence = record.sequence,
            status = record.result.label(),
            exit_code = ?record.result.exit_code(),
            duration_ms = record.duration.as_millis() as u64,
            "Command finished"
        );
        self.emit(RunEvent::CommandFinished {
            sequence: record.sequence,
            status: record.result.label(),
            exit_code: record.result.exit_code(),
            duration_ms: record.duration.as_millis() as u64,
        });
        self.log_workflow(&format!(
            "[{}] {} in {}",
            record.sequence,
            record.result.label(),
            format_duration(record.duration.as_millis() as u64),
        )).await;
        record.output()
    }

    async fn write_report(&self, decision: &Decision) -> Option<PathBuf> {
        let Some(report) = decision.report() else {
            info!("Completion carried no final report");
            return None;
        };
        let path = self.config.output_dir.join(FINAL_REPORT_FILE);
        match atomic_write(&path, report).await {
            Ok(()) => {
                info!(path = %path.display(), "Final report written");
                Some(path)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to write final report");
                None
            }
        }
    }

    /// Snapshot the canonical state with the decision that produced it.
    async fn persist(&self, decision: Option<&Decision>) {
        let metadata = serde_json::json!({
            "run_id": self.config.run_id,
            "session_start": self.session_start.to_rfc3339(),
            "iteration": self.iteration,
            "commands_executed": self.executor.executed(),
            "last_decision": decision,
            "build": option_env!("COO_GIT_HASH").unwrap_or("unknown"),
        });
        if let Err(e) = self.store.save(&self.state, metadata).await {
            warn!(path = %self.store.path().display(), error = %e, "Failed to save state snapshot");
        }
    }

    async fn save_stats(&mut self, phase: RunPhase) {
        let phase = phase.to_string();
        self.stats.record_iteration(self.iteration, self.executor.executed(), &phase);
        if let Err(e) = self.stats.save().await {
            warn!(error = %e, "Failed to save run stats");
        }
    }

    pub fn state(&self) -> &PentestState {
        &self.state
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }
}
