pub mod commands;
pub mod display;
pub mod run;
pub mod tools;

pub use commands::{Cli, Commands};
