pub mod events;
pub mod orchestrator;
pub mod state;

pub use events::RunEvent;
pub use orchestrator::Orchestrator;
pub use state::{AbortReason, OrchestratorConfig, RunPhase, RunSummary, Termination};
