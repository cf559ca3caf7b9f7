use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use quotewatch::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for quotewatch::AppCommand {
    fn from(cmd: Commands) -> quotewatch::AppCommand {
        match cmd {
            Commands::Add { symbol, crypto } => quotewatch::AppCommand::Add { symbol, crypto },
            Commands::Remove { symbol } => quotewatch::AppCommand::Remove { symbol },
            Commands::List => quotewatch::AppCommand::List,
            Commands::History { symbol, limit } => {
                quotewatch::AppCommand::History { symbol, limit }
            }
            Commands::Search { query } => quotewatch::AppCommand::Search { query },
            Commands::Refresh => quotewatch::AppCommand::Refresh,
            Commands::Watch => quotewatch::AppCommand::Watch,
            Commands::Seed => quotewatch::AppCommand::Seed,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Track an asset and fetch its first price
    Add {
        symbol: String,
        /// Treat the symbol as a crypto id instead of a stock ticker
        #[arg(long)]
        crypto: bool,
    },
    /// Stop tracking an asset and drop its history
    Remove { symbol: String },
    /// Display all tracked assets with their latest prices
    List,
    /// Display recent price history for an asset
    History {
        symbol: String,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Search for stock symbols
    Search { query: String },
    /// Update all stock prices once
    Refresh,
    /// Update stock prices continuously on the configured interval
    Watch,
    /// Track all symbols from the reference table
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => setup(),
        Some(cmd) => quotewatch::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

fn setup() -> anyhow::Result<()> {
    use anyhow::Context;

    let path = quotewatch::config::AppConfig::default_config_path()?;

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let default_config = r#"---
providers:
  yahoo:
    primary_base_url: "https://query1.finance.yahoo.com"
    secondary_base_url: "https://query2.finance.yahoo.com"
  rapidapi:
    base_url: "https://apidojo-yahoo-finance-v1.p.rapidapi.com"
    host: "apidojo-yahoo-finance-v1.p.rapidapi.com"
    # api_key: set here or via QUOTEWATCH_RAPIDAPI_KEY
  coingecko:
    base_url: "https://api.coingecko.com"

poll_interval_secs: 5
request_timeout_secs: 10
"#;

    std::fs::write(&path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}
