pub mod audit;
pub mod cli;
pub mod config;
pub mod decision;
pub mod errors;
pub mod executor;
pub mod llm;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod session;
pub mod utils;
