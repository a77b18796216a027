use std::env;

use crate::constants::{
    BINANCE_BASE_URL, BITGET_BASE_URL, COINGECKO_BASE_URL, DEFAULT_PORT, DEFAULT_PROVIDER_ORDER,
    DEFAULT_PROVIDER_TIMEOUT_SECS,
};
use crate::error::{AppError, Result};

/// Which upstream market-data source a price client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Binance,
    CoinGecko,
    Bitget,
}

impl ProviderKind {
    /// Parse from string
    pub fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "binance" => Ok(ProviderKind::Binance),
            "coingecko" => Ok(ProviderKind::CoinGecko),
            "bitget" => Ok(ProviderKind::Bitget),
            _ => Err(format!(
                "Invalid provider: '{}'. Valid values: binance, coingecko, bitget",
                s
            )),
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Binance => "binance",
            ProviderKind::CoinGecko => "coingecko",
            ProviderKind::Bitget => "bitget",
        }
    }
}

/// Service configuration derived from environment variables.
///
/// Every variable has a default so the server starts with no environment
/// at all; `PROVIDER_ORDER` is the only one that can fail to parse.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub binance_base_url: String,
    pub coingecko_base_url: String,
    pub bitget_base_url: String,
    pub provider_timeout_secs: u64,
    /// Fallback order for historical price retrieval, first tried first.
    pub provider_order: Vec<ProviderKind>,
}

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u16(name: &str, default: u16) -> u16 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let order_raw = env_str("PROVIDER_ORDER", &DEFAULT_PROVIDER_ORDER.join(","));
        let provider_order = parse_provider_order(&order_raw)?;

        Ok(Self {
            port: env_u16("COINCORR_PORT", DEFAULT_PORT),
            binance_base_url: env_str("BINANCE_BASE_URL", BINANCE_BASE_URL),
            coingecko_base_url: env_str("COINGECKO_BASE_URL", COINGECKO_BASE_URL),
            bitget_base_url: env_str("BITGET_BASE_URL", BITGET_BASE_URL),
            provider_timeout_secs: env_u64("PROVIDER_TIMEOUT_SECS", DEFAULT_PROVIDER_TIMEOUT_SECS),
            provider_order,
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            binance_base_url: BINANCE_BASE_URL.to_string(),
            coingecko_base_url: COINGECKO_BASE_URL.to_string(),
            bitget_base_url: BITGET_BASE_URL.to_string(),
            provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT_SECS,
            provider_order: vec![
                ProviderKind::Binance,
                ProviderKind::CoinGecko,
                ProviderKind::Bitget,
            ],
        }
    }
}

/// Parse a comma-separated provider list. Duplicates keep their first
/// position; an unknown name or an empty result is a configuration error.
fn parse_provider_order(raw: &str) -> Result<Vec<ProviderKind>> {
    let mut order = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let kind = ProviderKind::from_str(part).map_err(AppError::Config)?;
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    if order.is_empty() {
        return Err(AppError::Config(format!(
            "PROVIDER_ORDER resolved to no providers: '{}'",
            raw
        )));
    }
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_from_str() {
        assert_eq!(
            ProviderKind::from_str("binance").unwrap(),
            ProviderKind::Binance
        );
        assert_eq!(
            ProviderKind::from_str("BINANCE").unwrap(),
            ProviderKind::Binance
        );
        assert_eq!(
            ProviderKind::from_str("coingecko").unwrap(),
            ProviderKind::CoinGecko
        );
        assert_eq!(
            ProviderKind::from_str("bitget").unwrap(),
            ProviderKind::Bitget
        );
        assert!(ProviderKind::from_str("kraken").is_err());
    }

    #[test]
    fn test_parse_provider_order_default() {
        let order = parse_provider_order("binance,coingecko,bitget").unwrap();
        assert_eq!(
            order,
            vec![
                ProviderKind::Binance,
                ProviderKind::CoinGecko,
                ProviderKind::Bitget
            ]
        );
    }

    #[test]
    fn test_parse_provider_order_subset_and_spacing() {
        let order = parse_provider_order(" coingecko , binance ").unwrap();
        assert_eq!(order, vec![ProviderKind::CoinGecko, ProviderKind::Binance]);
    }

    #[test]
    fn test_parse_provider_order_dedupes() {
        let order = parse_provider_order("bitget,bitget,binance").unwrap();
        assert_eq!(order, vec![ProviderKind::Bitget, ProviderKind::Binance]);
    }

    #[test]
    fn test_parse_provider_order_rejects_unknown() {
        assert!(parse_provider_order("binance,ftx").is_err());
    }

    #[test]
    fn test_parse_provider_order_rejects_empty() {
        assert!(parse_provider_order("").is_err());
        assert!(parse_provider_order(" , ,").is_err());
    }
}
