//! Provider abstraction for historical daily closing prices.
//!
//! Each upstream market-data source implements [`PriceProvider`]; the
//! fetcher walks them in configured order. Implementations make exactly
//! one HTTP attempt per call, so retry and fallback policy live in one
//! place (`services::fetcher`).

use async_trait::async_trait;
use thiserror::Error as ThisError;

use crate::models::PriceSeries;

#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Provider name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Fetch up to `days` daily closing prices for `coin_id`, oldest first.
    async fn fetch_daily_closes(
        &self,
        coin_id: &str,
        days: u32,
    ) -> Result<PriceSeries, ProviderError>;
}

/// Why a single provider attempt failed.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum ProviderErrorKind {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("rate limited (HTTP 429)")]
    RateLimit,

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    Parse(String),

    #[error("empty price data")]
    Empty,

    #[error("API error {code}: {message}")]
    Api { code: String, message: String },
}

impl ProviderErrorKind {
    /// Classify a non-success HTTP status. 429 gets its own kind so rate
    /// limits are readable in aggregated failure reports.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            ProviderErrorKind::RateLimit
        } else {
            ProviderErrorKind::Status(status.as_u16())
        }
    }
}

/// A failed attempt against one provider.
#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{provider}: {kind}")]
pub struct ProviderError {
    pub provider: &'static str,
    pub kind: ProviderErrorKind,
}

impl ProviderError {
    pub fn new(provider: &'static str, kind: ProviderErrorKind) -> Self {
        Self { provider, kind }
    }

    pub fn network(provider: &'static str, err: &reqwest::Error) -> Self {
        Self::new(provider, ProviderErrorKind::Network(err.to_string()))
    }
}

/// Every configured provider failed for one coin.
///
/// Carries each attempt's error so the caller can see the whole fallback
/// chain, not just the last failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllProvidersFailed {
    pub coin: String,
    pub days: u32,
    pub attempts: Vec<ProviderError>,
}

impl std::fmt::Display for AllProvidersFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Failed to fetch prices for '{}' ({} days) from all providers",
            self.coin, self.days
        )?;
        for attempt in &self.attempts {
            write!(f, "; {}", attempt)?;
        }
        Ok(())
    }
}

impl std::error::Error for AllProvidersFailed {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS),
            ProviderErrorKind::RateLimit
        );
        assert_eq!(
            ProviderErrorKind::from_status(reqwest::StatusCode::IM_A_TEAPOT),
            ProviderErrorKind::Status(418)
        );
    }

    #[test]
    fn test_all_providers_failed_lists_every_attempt() {
        let err = AllProvidersFailed {
            coin: "bitcoin".to_string(),
            days: 30,
            attempts: vec![
                ProviderError::new("Binance", ProviderErrorKind::Status(451)),
                ProviderError::new("CoinGecko", ProviderErrorKind::RateLimit),
                ProviderError::new("Bitget", ProviderErrorKind::Empty),
            ],
        };

        let message = err.to_string();
        assert!(message.contains("bitcoin"));
        assert!(message.contains("Binance: HTTP status 451"));
        assert!(message.contains("CoinGecko: rate limited"));
        assert!(message.contains("Bitget: empty price data"));
    }
}
