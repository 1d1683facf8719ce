mod commands;
mod config;
mod console;
mod render;

use clap::{Parser, Subcommand};
use config::CliConfig;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yuletide_core::YuletideError;
use yuletide_lottery::GameError;

#[derive(Parser)]
#[command(name = "yuletide")]
#[command(about = "Christmas gift drops with a book and role lottery")]
#[command(version)]
struct Cli {
    /// Data directory for configuration and book winners
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a gift session against the console
    Run(commands::RunArgs),
    /// Show or change game settings
    Config(commands::ConfigArgs),
    /// Explain the game and the current odds
    Info,
    /// List users who won the book
    Winners(commands::WinnersArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(format!(
            "yuletide={},yuletide_core={},yuletide_lottery={}",
            log_level, log_level, log_level
        )))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli_config = CliConfig::new(cli.data_dir);

    // Ensure data directory exists
    tokio::fs::create_dir_all(&cli_config.data_dir).await?;

    let result = match cli.command {
        Commands::Run(args) => commands::run_session(&cli_config, args).await,
        Commands::Config(args) => commands::configure(&cli_config, args).await,
        Commands::Info => commands::show_info(&cli_config).await,
        Commands::Winners(args) => commands::list_winners(&cli_config, args).await,
    };

    if let Err(e) = result {
        if let Some(YuletideError::Config(msg)) = e.downcast_ref::<YuletideError>() {
            eprintln!("Error: {}", msg);
        } else if let Some(GameError::AlreadyRunning) = e.downcast_ref::<GameError>() {
            eprintln!("Error: the game is already running");
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }

    Ok(())
}
