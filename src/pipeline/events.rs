use super::state::Termination;

/// Lifecycle messages streamed from the loop to a live display.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted {
        run_id: String,
        target: String,
        max_iterations: u32,
    },
    IterationStarted {
        iteration: u32,
        max_iterations: u32,
    },
    DecisionReceived {
        iteration: u32,
        analysis: String,
        next_command: String,
    },
    StateAccepted {
        summary: String,
    },
    StateRejected {
        reason: String,
    },
    CommandStarted {
        sequence: u32,
        command: String,
    },
    CommandFinished {
        sequence: u32,
        status: &'static str,
        exit_code: Option<i32>,
        duration_ms: u64,
    },
    Terminated {
        termination: Termination,
        iterations: u32,
        duration_ms: u64,
    },
}
