//! CLI application and HTTP service for medical form OCR.

mod api;
mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use commands::{batch, config, extract, predict, serve};

/// Medical form OCR - Extract screening values from scanned forms
#[derive(Parser)]
#[command(name = "formscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve(serve::ServeArgs),

    /// Extract fields from a single form
    Extract(extract::ExtractArgs),

    /// Extract fields from multiple forms
    Batch(batch::BatchArgs),

    /// Request a prediction from the prediction service
    Predict(predict::PredictArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity unless RUST_LOG says otherwise
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let initialized = if cli.log_json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    initialized.map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))?;

    // Execute command
    match cli.command {
        Commands::Serve(args) => serve::run(args, cli.config.as_deref()).await,
        Commands::Extract(args) => extract::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Predict(args) => predict::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args).await,
    }
}
