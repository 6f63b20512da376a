use clap::{Parser, Subcommand, Args};

#[derive(Parser)]
#[command(
    name = "coo",
    version,
    long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("COO_BUILD_TIMESTAMP"), ")"),
    about = "Cybersecurity Operations Orchestrator: LLM-directed reconnaissance"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run an assessment against a target
    Run(RunArgs),
    /// Store an API key in groq_config.json
    SaveApiKey(SaveApiKeyArgs),
    /// Check which scanning tools are installed
    Tools(ToolsArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

#[derive(Args, Clone, Default)]
pub struct RunArgs {
    /// Target IP address
    #[arg(short, long)]
    pub target: String,

    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output directory for transcripts, state and report [default: pentest_results]
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// LLM provider: groq, openai, openrouter, local [default: groq]
    #[arg(long)]
    pub provider: Option<String>,

    /// LLM model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// LLM API key (or use env vars / groq_config.json)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Override the provider endpoint
    #[arg(long)]
    pub base_url: Option<String>,

    /// Maximum decision rounds [default: 50]
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Default command timeout in seconds [default: 300]
    #[arg(long)]
    pub command_timeout: Option<u64>,

    /// Delay between iterations in seconds [default: 3]
    #[arg(long)]
    pub delay: Option<u64>,
}

#[derive(Args, Clone)]
pub struct SaveApiKeyArgs {
    /// API key to store
    pub api_key: String,
}

#[derive(Args, Clone)]
pub struct ToolsArgs {
    /// YAML configuration file with tool overrides
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Config file to validate
    pub config: String,
}
