pub mod state;
pub mod decision;
pub mod execution;
mod lenient;

pub use state::{PentestState, OpenPort, Vulnerability, REQUIRED_FIELDS};
pub use decision::{Decision, NextStep, COMPLETE_SENTINEL};
pub use execution::{ExecutionRecord, ExecutionResult};
