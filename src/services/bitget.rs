//! Bitget price client (tertiary provider) and coin discovery.
//!
//! Spot candles from `/api/v2/spot/market/candles`, addressed by trading
//! symbol with a millisecond window and granularity token `1D`. Bitget
//! wraps everything in an envelope whose `code` field must be `"00000"`
//! regardless of HTTP status. Candles arrive newest-first and are reversed
//! to satisfy the oldest-first contract.
//!
//! The same envelope discipline applies to `/api/v2/spot/public/coins`,
//! which backs the coin-listing endpoint.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::constants::{MS_PER_DAY, USER_AGENT};
use crate::error::{AppError, Result};
use crate::models::PriceSeries;
use crate::services::provider::{PriceProvider, ProviderError, ProviderErrorKind};
use crate::services::symbols::SymbolTable;

const PROVIDER_NAME: &str = "Bitget";

/// Envelope code Bitget uses for success.
const SUCCESS_CODE: &str = "00000";

#[derive(Debug, Deserialize)]
struct BitgetEnvelope {
    code: String,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct BitgetCoin {
    #[serde(rename = "coinId", default)]
    coin_id: String,
    #[serde(rename = "coinName", default)]
    coin_name: String,
}

pub struct BitgetClient {
    client: Client,
    base_url: String,
    symbols: Arc<SymbolTable>,
}

impl BitgetClient {
    pub fn new(base_url: String, timeout: Duration, symbols: Arc<SymbolTable>) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build Bitget client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            symbols,
        })
    }

    /// Fetch the tradable coin listing, lowercased coin ids.
    ///
    /// Used for coin discovery; callers append the returned ids to the
    /// symbol table so later price fetches can resolve them.
    pub async fn list_coins(&self) -> std::result::Result<Vec<String>, ProviderError> {
        let url = format!("{}/api/v2/spot/public/coins", self.base_url);

        debug!("Fetching Bitget coin listing");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
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

        parse_coins(&body).map_err(|kind| ProviderError::new(PROVIDER_NAME, kind))
    }
}

#[async_trait]
impl PriceProvider for BitgetClient {
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
        let url = format!("{}/api/v2/spot/market/candles", self.base_url);

        debug!(%symbol, days, "Fetching Bitget candles");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("symbol", symbol.as_str()),
                ("granularity", "1D"),
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

        parse_candles(&body).map_err(|kind| ProviderError::new(PROVIDER_NAME, kind))
    }
}

fn check_envelope(body: &Value) -> std::result::Result<Option<Value>, ProviderErrorKind> {
    let envelope: BitgetEnvelope =
        serde_json::from_value(body.clone()).map_err(|e| ProviderErrorKind::Parse(e.to_string()))?;

    if envelope.code != SUCCESS_CODE {
        return Err(ProviderErrorKind::Api {
            code: envelope.code,
            message: envelope.msg,
        });
    }

    Ok(envelope.data)
}

/// Extract closing prices from a candle envelope. Candles are
/// `[timestamp, open, high, low, close, baseVolume, quoteVolume]` with
/// values as JSON strings, newest first; the result is reversed so the
/// oldest close comes first.
fn parse_candles(body: &Value) -> std::result::Result<Vec<f64>, ProviderErrorKind> {
    let data = check_envelope(body)?;

    let candles = match data {
        Some(Value::Array(candles)) if !candles.is_empty() => candles,
        Some(Value::Array(_)) | None => return Err(ProviderErrorKind::Empty),
        Some(other) => {
            return Err(ProviderErrorKind::Parse(format!(
                "expected candle array, got: {}",
                other
            )))
        }
    };

    let mut closes = candles
        .iter()
        .map(candle_close)
        .collect::<std::result::Result<Vec<f64>, _>>()?;
    closes.reverse();
    Ok(closes)
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

/// Extract lowercase coin ids from the public coin listing. `coinId` is
/// preferred, with `coinName` as the fallback; entries with neither are
/// skipped. An empty listing counts as a failure.
fn parse_coins(body: &Value) -> std::result::Result<Vec<String>, ProviderErrorKind> {
    let data = check_envelope(body)?.ok_or(ProviderErrorKind::Empty)?;

    let entries: Vec<BitgetCoin> =
        serde_json::from_value(data).map_err(|e| ProviderErrorKind::Parse(e.to_string()))?;

    let coins: Vec<String> = entries
        .into_iter()
        .filter_map(|entry| {
            let id = if entry.coin_id.is_empty() {
                entry.coin_name
            } else {
                entry.coin_id
            };
            if id.is_empty() {
                None
            } else {
                Some(id.to_lowercase())
            }
        })
        .collect();

    if coins.is_empty() {
        return Err(ProviderErrorKind::Empty);
    }

    Ok(coins)
}
