//! One-shot price fetch through the provider chain.
//!
//! Useful for checking provider availability and symbol resolution from
//! the command line without running the server.
//!
//! Usage:
//! - Basic: `coincorr fetch bitcoin`
//! - With options: `coincorr fetch ethereum --days 7 --timeout 10`

use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{PriceFetcher, SymbolTable};
use crate::stats;

pub async fn run(coin: String, days: u32, timeout: u64) -> Result<()> {
    let mut config = AppConfig::from_env()?;
    config.provider_timeout_secs = timeout;

    let symbols = Arc::new(SymbolTable::new());
    let symbol = symbols.resolve(&coin).await;
    let fetcher = PriceFetcher::from_config(&config, symbols)?;

    println!("Fetching {} days of daily closes for {} ({})", days, coin, symbol);

    let prices = fetcher.fetch_historical_prices(&coin, days).await?;
    println!("Got {} closes (oldest first):", prices.len());
    for price in &prices {
        println!("  {}", price);
    }

    let returns = stats::compute_returns(&prices)?;
    println!("Daily returns (%):");
    for value in &returns {
        println!("  {:+.4}", value);
    }

    Ok(())
}
