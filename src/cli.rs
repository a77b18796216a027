use clap::{Parser, Subcommand};

use crate::commands;
use crate::constants::{DEFAULT_DAYS, DEFAULT_PROVIDER_TIMEOUT_SECS};
use crate::error::Result;

#[derive(Parser)]
#[command(name = "coincorr")]
#[command(about = "Crypto correlation API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen port (overrides COINCORR_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Fetch daily closes for one coin through the provider chain
    Fetch {
        /// Coin id, e.g. "bitcoin"
        coin: String,

        /// Days of history to request
        #[arg(short, long, default_value_t = DEFAULT_DAYS)]
        days: u32,

        /// Per-provider timeout in seconds
        #[arg(long, default_value_t = DEFAULT_PROVIDER_TIMEOUT_SECS)]
        timeout: u64,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port } => commands::serve::run(port).await,
        Commands::Fetch {
            coin,
            days,
            timeout,
        } => commands::fetch::run(coin, days, timeout).await,
    }
}
