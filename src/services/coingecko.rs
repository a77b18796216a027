//! CoinGecko price client (secondary provider).
//!
//! Addressed by coin id directly, so no symbol resolution step. Daily
//! prices come from `/api/v3/coins/{id}/market_chart`; the envelope holds
//! `{"prices": [[timestamp, price], ...]}` oldest-first and only the price
//! component is kept. A 429 here is an ordinary failure like any other:
//! the fetcher falls through to the next provider instead of retrying.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::USER_AGENT;
use crate::error::{AppError, Result};
use crate::models::PriceSeries;
use crate::services::provider::{PriceProvider, ProviderError, ProviderErrorKind};

const PROVIDER_NAME: &str = "CoinGecko";

#[derive(Debug, Deserialize)]
struct MarketChartResponse {
    /// `[timestamp_ms, price]` pairs, oldest first.
    prices: Vec<(f64, f64)>,
}

pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build CoinGecko client: {}", e)))?;

        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl PriceProvider for CoinGeckoClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_daily_closes(
        &self,
        coin_id: &str,
        days: u32,
    ) -> std::result::Result<PriceSeries, ProviderError> {
        let url = format!("{}/api/v3/coins/{}/market_chart", self.base_url, coin_id);

        debug!(coin_id, days, "Fetching CoinGecko market chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("vs_currency", "usd"),
                ("days", &days.to_string()),
                ("interval", "daily"),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::network(PROVIDER_NAME, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::new(
                PROVIDER_NAME,
                ProviderErrorKind::from_status(status),
            ));
        }

        let body: Value = response.json().await.map_err(|e| {
            ProviderError::new(PROVIDER_NAME, ProviderErrorKind::Parse(e.to_string()))
        })?;

        parse_market_chart(&body).map_err(|kind| ProviderError::new(PROVIDER_NAME, kind))
    }
}

/// Extract the price component of each `[timestamp, price]` pair.
fn parse_market_chart(body: &Value) -> std::result::Result<Vec<f64>, ProviderErrorKind> {
    let chart: MarketChartResponse = serde_json::from_value(body.clone())
        .map_err(|e| ProviderErrorKind::Parse(e.to_string()))?;

    if chart.prices.is_empty() {
        return Err(ProviderErrorKind::Empty);
    }

    Ok(chart.prices.into_iter().map(|(_, price)| price).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_market_chart_extracts_prices() {
        let body = json!({
            "prices": [
                [1700000000000i64, 36500.12],
                [1700086400000i64, 37012.55],
                [1700172800000i64, 36888.0]
            ],
            "market_caps": [],
            "total_volumes": []
        });

        let prices = parse_market_chart(&body).unwrap();
        assert_eq!(prices, vec![36500.12, 37012.55, 36888.0]);
    }

    #[test]
    fn test_parse_market_chart_empty_is_failure() {
        let body = json!({ "prices": [] });
        assert_eq!(parse_market_chart(&body), Err(ProviderErrorKind::Empty));
    }

    #[test]
    fn test_parse_market_chart_missing_prices_is_parse_error() {
        let body = json!({ "error": "coin not found" });
        assert!(matches!(
            parse_market_chart(&body),
            Err(ProviderErrorKind::Parse(_))
        ));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_bitcoin_daily() {
        let client = CoinGeckoClient::new(
            crate::constants::COINGECKO_BASE_URL.to_string(),
            Duration::from_secs(20),
        )
        .unwrap();

        let closes = client.fetch_daily_closes("bitcoin", 5).await.unwrap();
        assert!(!closes.is_empty());
        assert!(closes.iter().all(|price| *price > 0.0));
    }
}
