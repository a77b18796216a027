//! Binance price client (primary provider).
//!
//! Daily klines from `/api/v3/klines`, addressed by trading symbol over an
//! explicit millisecond window ending now. Candles arrive oldest-first;
//! the close is element 4 of each candle array, encoded as a JSON string.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::constants::{MS_PER_DAY, USER_AGENT};
use crate::error::{AppError, Result};
use crate::models::PriceSeries;
use crate::services::provider::{PriceProvider, ProviderError, ProviderErrorKind};
use crate::services::symbols::SymbolTable;

const PROVIDER_NAME: &str = "Binance";

pub struct BinanceClient {
    client: Client,
    base_url: String,
    symbols: Arc<SymbolTable>,
}

impl BinanceClient {
    pub fn new(base_url: String, timeout: Duration, symbols: Arc<SymbolTable>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build Binance client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            symbols,
        })
    }
}

#[async_trait]
impl PriceProvider for BinanceClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn fetch_daily_closes(
        &self,
        coin_id: &str,
        days: u32,
    ) -> std::result::Result<PriceSeries, ProviderError> {
        let symbol = self.symbols.resolve(coin_id).await;
        let end_time = Utc::now().timestamp_millis();
        let start_time = end_time - i64::from(days) * MS_PER_DAY;
        let url = format!("{}/api/v3/klines", self.base_url);

        debug!(%symbol, days, "Fetching Binance klines");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", symbol.as_str()),
                ("interval", "1d"),
                ("startTime", &start_time.to_string()),
                ("endTime", &end_time.to_string()),
                ("limit", &days.to_string()),
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

        parse_klines(&body).map_err(|kind| ProviderError::new(PROVIDER_NAME, kind))
    }
}

/// Extract closing prices from a kline array. Each kline is
/// `[openTime, open, high, low, close, volume, ...]`; order is kept as
/// returned (oldest first).
fn parse_klines(body: &Value) -> std::result::Result<Vec<f64>, ProviderErrorKind> {
    let candles = body
        .as_array()
        .ok_or_else(|| ProviderErrorKind::Parse("expected a JSON array of klines".to_string()))?;

    if candles.is_empty() {
        return Err(ProviderErrorKind::Empty);
    }

    candles.iter().map(candle_close).collect()
}

fn candle_close(candle: &Value) -> std::result::Result<f64, ProviderErrorKind> {
    let close = candle
        .get(4)
        .ok_or_else(|| ProviderErrorKind::Parse("candle has no close element".to_string()))?;

    match close {
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|_| ProviderErrorKind::Parse(format!("unparseable close '{}'", s))),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| ProviderErrorKind::Parse("close out of f64 range".to_string())),
        other => Err(ProviderErrorKind::Parse(format!(
            "unexpected close type: {}",
            other
        ))),
    }
}
