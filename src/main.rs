use clap::Parser;
use coo::cli::{self, Commands};
use coo::config::{self, credentials};
use coo::errors::CooError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    let result = match cli.command {
        Commands::Run(args) => cli::run::handle_run(args).await,
        Commands::SaveApiKey(args) => handle_save_api_key(args).await.map(|_| 0),
        Commands::Tools(args) => cli::tools::handle_tools(args).await.map(|_| 0),
        Commands::Validate(args) => handle_validate(args).await.map(|_| 0),
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                CooError::Config(_) => 2,
                CooError::Authentication(_) => 4,
                CooError::InvalidTarget(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), CooError> {
    let path = std::path::PathBuf::from(&args.config);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}

async fn handle_save_api_key(args: cli::commands::SaveApiKeyArgs) -> Result<(), CooError> {
    let path = std::path::Path::new(credentials::SAVED_KEY_FILE);
    credentials::save_api_key(path, &args.api_key).await?;
    println!("API key saved to {}", path.display());
    Ok(())
}
