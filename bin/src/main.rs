//! mims CLI - Ingest OHLCV candles and query them with technical indicators.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use mims_lib::SnapshotFile;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use commands::query::QueryArgs;

#[derive(Parser)]
#[command(name = "mims")]
#[command(about = "Market-data queries with interval coverage and technical indicators", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only, no progress output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Directory holding the store snapshot
    #[arg(long, env = "MIMS_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Import candles from a CSV file (symbol,open,high,low,close,volume,timestamp)
    Ingest {
        /// CSV file to import
        path: PathBuf,

        /// Broker the pairs are registered under
        #[arg(short, long, default_value = "COINBASE")]
        broker: String,
    },

    /// Query bucketed candles with indicators
    Query(QueryArgs),

    /// List registered pairs
    Pairs {
        /// Only list pairs quoted by this broker
        #[arg(short, long)]
        broker: Option<String>,
    },

    /// List registered brokers
    Brokers,

    /// Show the ingested ranges of a pair
    Coverage {
        /// Pair symbol (e.g., BTC/USD)
        symbol: String,

        /// Broker quoting the pair
        #[arg(short, long, default_value = "COINBASE")]
        broker: String,

        /// Start of a range to check for gaps (RFC 3339)
        #[arg(short, long, requires = "end")]
        start: Option<chrono::DateTime<chrono::Utc>>,

        /// End of a range to check for gaps (RFC 3339)
        #[arg(short, long, requires = "start")]
        end: Option<chrono::DateTime<chrono::Utc>>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let data_dir = cli.data_dir.unwrap_or_else(SnapshotFile::default_dir);
    let snapshot = SnapshotFile::in_dir(&data_dir);
    tracing::debug!(path = %snapshot.path().display(), "using store snapshot");

    match command {
        Commands::Ingest { path, broker } => {
            commands::ingest::ingest(&snapshot, &path, &broker, cli.quiet).await
        }
        Commands::Query(args) => commands::query::query(&snapshot, args).await,
        Commands::Pairs { broker } => commands::pairs::list_pairs(&snapshot, broker.as_deref()).await,
        Commands::Brokers => commands::brokers::list_brokers(&snapshot).await,
        Commands::Coverage {
            symbol,
            broker,
            start,
            end,
        } => commands::coverage::show_coverage(&snapshot, &symbol, &broker, start.zip(end)).await,
    }
}

/// Installs the stderr subscriber; `RUST_LOG` overrides the flag-derived level.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
