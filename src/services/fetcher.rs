//! Ordered-fallback retrieval of historical prices.
//!
//! Providers are tried strictly in configured order with the same
//! `(coin_id, days)` arguments; the first non-empty series wins. There is
//! no merging and no quorum. Every failed attempt is recorded so the
//! exhaustion error reports the whole fallback chain.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{AppConfig, ProviderKind};
use crate::error::Result;
use crate::models::PriceSeries;
use crate::services::binance::BinanceClient;
use crate::services::bitget::BitgetClient;
use crate::services::coingecko::CoinGeckoClient;
use crate::services::provider::{AllProvidersFailed, PriceProvider};
use crate::services::symbols::SymbolTable;

pub struct PriceFetcher {
    providers: Vec<Arc<dyn PriceProvider>>,
}

impl PriceFetcher {
    pub fn new(providers: Vec<Arc<dyn PriceProvider>>) -> Self {
        Self { providers }
    }

    /// Build the production provider chain from configuration.
    pub fn from_config(config: &AppConfig, symbols: Arc<SymbolTable>) -> Result<Self> {
        let timeout = Duration::from_secs(config.provider_timeout_secs);

        let mut providers: Vec<Arc<dyn PriceProvider>> =
            Vec::with_capacity(config.provider_order.len());
        for kind in &config.provider_order {
            let provider: Arc<dyn PriceProvider> = match kind {
                ProviderKind::Binance => Arc::new(BinanceClient::new(
                    config.binance_base_url.clone(),
                    timeout,
                    symbols.clone(),
                )?),
                ProviderKind::CoinGecko => Arc::new(CoinGeckoClient::new(
                    config.coingecko_base_url.clone(),
                    timeout,
                )?),
                ProviderKind::Bitget => Arc::new(BitgetClient::new(
                    config.bitget_base_url.clone(),
                    timeout,
                    symbols.clone(),
                )?),
            };
            providers.push(provider);
        }

        Ok(Self { providers })
    }

    /// Fetch daily closes for one coin, walking providers in order.
    ///
    /// The coin id is normalized once here; providers receive it
    /// unchanged on every attempt.
    pub async fn fetch_historical_prices(
        &self,
        coin_id: &str,
        days: u32,
    ) -> std::result::Result<PriceSeries, AllProvidersFailed> {
        let coin = SymbolTable::normalize(coin_id);
        let total = self.providers.len();
        let mut attempts = Vec::with_capacity(total);

        for (index, provider) in self.providers.iter().enumerate() {
            debug!(
                provider = provider.name(),
                coin = %coin,
                attempt = index + 1,
                total,
                "Trying provider"
            );

            match provider.fetch_daily_closes(&coin, days).await {
                Ok(prices) => {
                    info!(
                        provider = provider.name(),
                        coin = %coin,
                        days,
                        count = prices.len(),
                        "Fetched daily closes"
                    );
                    return Ok(prices);
                }
                Err(err) => {
                    warn!(
                        provider = err.provider,
                        coin = %coin,
                        days,
                        error = %err.kind,
                        "Provider attempt failed"
                    );
                    attempts.push(err);
                }
            }
        }

        Err(AllProvidersFailed {
            coin,
            days,
            attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::{ProviderError, ProviderErrorKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubProvider {
        name: &'static str,
        response: std::result::Result<Vec<f64>, ProviderErrorKind>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn ok(name: &'static str, prices: Vec<f64>) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Ok(prices),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, kind: ProviderErrorKind) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Err(kind),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn fetch_daily_closes(
            &self,
            _coin_id: &str,
            _days: u32,
        ) -> std::result::Result<Vec<f64>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .map_err(|kind| ProviderError::new(self.name, kind))
        }
    }

    #[tokio::test]
    async fn test_first_provider_success_short_circuits() {
        let first = StubProvider::ok("First", vec![1.0, 2.0, 3.0]);
        let second = StubProvider::ok("Second", vec![9.0]);
        let third = StubProvider::ok("Third", vec![7.0]);
        let fetcher = PriceFetcher::new(vec![first.clone(), second.clone(), third.clone()]);

        let prices = fetcher.fetch_historical_prices("bitcoin", 30).await.unwrap();

        assert_eq!(prices, vec![1.0, 2.0, 3.0]);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
        assert_eq!(third.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_last_provider() {
        let first = StubProvider::failing("First", ProviderErrorKind::Status(451));
        let second = StubProvider::failing("Second", ProviderErrorKind::RateLimit);
        let third = StubProvider::ok("Third", vec![42.0, 43.0]);
        let fetcher = PriceFetcher::new(vec![first.clone(), second.clone(), third.clone()]);

        let prices = fetcher.fetch_historical_prices("ethereum", 7).await.unwrap();

        assert_eq!(prices, vec![42.0, 43.0]);
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
        assert_eq!(third.calls(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_attempt_in_order() {
        let first = StubProvider::failing("First", ProviderErrorKind::Status(500));
        let second = StubProvider::failing("Second", ProviderErrorKind::RateLimit);
        let third = StubProvider::failing("Third", ProviderErrorKind::Empty);
        let fetcher = PriceFetcher::new(vec![first.clone(), second.clone(), third.clone()]);

        let err = fetcher
            .fetch_historical_prices("Shiba Inu", 30)
            .await
            .unwrap_err();

        assert_eq!(err.coin, "shiba-inu"); // normalized once at entry
        assert_eq!(err.days, 30);
        assert_eq!(err.attempts.len(), 3);
        assert_eq!(err.attempts[0].provider, "First");
        assert_eq!(err.attempts[0].kind, ProviderErrorKind::Status(500));
        assert_eq!(err.attempts[1].provider, "Second");
        assert_eq!(err.attempts[1].kind, ProviderErrorKind::RateLimit);
        assert_eq!(err.attempts[2].provider, "Third");
        assert_eq!(err.attempts[2].kind, ProviderErrorKind::Empty);
    }

    #[tokio::test]
    async fn test_each_provider_called_at_most_once() {
        let only = StubProvider::failing("Only", ProviderErrorKind::Network("timeout".into()));
        let fetcher = PriceFetcher::new(vec![only.clone()]);

        let err = fetcher.fetch_historical_prices("bitcoin", 30).await.unwrap_err();

        assert_eq!(only.calls(), 1);
        assert_eq!(err.attempts.len(), 1);
    }

    #[test]
    fn test_from_config_respects_provider_order() {
        let config = AppConfig {
            provider_order: vec![ProviderKind::Bitget, ProviderKind::Binance],
            ..AppConfig::default()
        };
        let fetcher = PriceFetcher::from_config(&config, Arc::new(SymbolTable::new())).unwrap();

        let names: Vec<&str> = fetcher.providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Bitget", "Binance"]);
    }
}
