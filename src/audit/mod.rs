pub mod workflow_logger;
pub mod stats_tracker;
pub mod utils;

pub use workflow_logger::WorkflowLogger;
pub use stats_tracker::{StatsTracker, RunStats};
