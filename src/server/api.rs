//! HTTP handlers: thin glue over the fetcher and the statistics engine.
//!
//! Multi-coin endpoints fetch sequentially and fail the whole request on
//! the first coin whose providers are all exhausted. Response objects
//! keep the requested coin order (serde_json preserve_order).

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::constants::{
    BENCHMARK_COIN, COINS_CACHE_TTL_SECS, DEFAULT_BETA_COINS, DEFAULT_DAYS, DEFAULT_MATRIX_COINS,
    DEFAULT_WINDOW,
};
use crate::models::RollingCorrelationPoint;
use crate::server::{AppState, CoinsCache};
use crate::services::{AllProvidersFailed, SymbolTable};
use crate::stats::{self, StatsError};

/// Client-facing error for the API endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// Bad query parameters or a statistics contract violation.
    BadRequest(String),
    /// Every provider failed for one of the requested coins.
    Upstream(AllProvidersFailed),
}

impl From<StatsError> for ApiError {
    fn from(err: StatsError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<AllProvidersFailed> for ApiError {
    fn from(err: AllProvidersFailed) -> Self {
        ApiError::Upstream(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": message })),
            )
                .into_response(),
            ApiError::Upstream(err) => (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": err.to_string(),
                    "coin": err.coin,
                    "days": err.days,
                    "attempts": err
                        .attempts
                        .iter()
                        .map(|attempt| attempt.to_string())
                        .collect::<Vec<_>>(),
                })),
            )
                .into_response(),
        }
    }
}

fn default_matrix_coins() -> String {
    DEFAULT_MATRIX_COINS.to_string()
}

fn default_beta_coins() -> String {
    DEFAULT_BETA_COINS.to_string()
}

fn default_days() -> u32 {
    DEFAULT_DAYS
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_coin_a() -> String {
    "ethereum".to_string()
}

fn default_coin_b() -> String {
    BENCHMARK_COIN.to_string()
}

/// Query parameters for /api/correlation-matrix
#[derive(Debug, Deserialize)]
pub struct MatrixQuery {
    /// Comma-separated coin ids
    #[serde(default = "default_matrix_coins")]
    coins: String,

    #[serde(default = "default_days")]
    days: u32,
}

/// Query parameters for /api/rolling-correlation
#[derive(Debug, Deserialize)]
pub struct RollingQuery {
    #[serde(default = "default_coin_a")]
    coin_a: String,

    #[serde(default = "default_coin_b")]
    coin_b: String,

    #[serde(default = "default_days")]
    days: u32,

    /// Trailing window size, in return days
    #[serde(default = "default_window")]
    window: usize,
}

/// Query parameters for /api/beta
#[derive(Debug, Deserialize)]
pub struct BetaQuery {
    /// Comma-separated coin ids; beta is computed against bitcoin
    #[serde(default = "default_beta_coins")]
    coins: String,

    #[serde(default = "default_days")]
    days: u32,
}

#[derive(Debug, Serialize)]
pub struct MatrixResponse {
    pub coins: Vec<String>,
    pub days: u32,
    pub matrix: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct RollingResponse {
    pub coin_a: String,
    pub coin_b: String,
    pub days: u32,
    pub window: usize,
    pub rolling_correlations: Vec<RollingCorrelationPoint>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct BetaResponse {
    pub benchmark: &'static str,
    pub days: u32,
    pub betas: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct CoinsResponse {
    pub coins: Vec<String>,
    pub source: &'static str,
    pub count: usize,
}

/// Split a comma-separated coin parameter into normalized ids.
fn parse_coin_list(raw: &str) -> Result<Vec<String>, ApiError> {
    let coins: Vec<String> = raw
        .split(',')
        .map(SymbolTable::normalize)
        .filter(|coin| !coin.is_empty())
        .collect();

    if coins.is_empty() {
        return Err(ApiError::BadRequest(
            "coins must name at least one coin".to_string(),
        ));
    }
    Ok(coins)
}

fn check_days(days: u32) -> Result<(), ApiError> {
    if days < 2 {
        return Err(ApiError::BadRequest(format!(
            "days must be at least 2, got {}",
            days
        )));
    }
    Ok(())
}

/// GET / - service identification
pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Crypto Correlation API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - liveness and uptime
pub async fn health_handler(State(app_state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": app_state.started_at.elapsed().as_secs(),
        "known_coins": app_state.symbols.len().await,
    }))
}

/// GET /api/correlation-matrix - pairwise Pearson correlation of returns
///
/// Example: /api/correlation-matrix?coins=bitcoin,ethereum,solana&days=30
pub async fn correlation_matrix_handler(
    State(app_state): State<AppState>,
    Query(params): Query<MatrixQuery>,
) -> Result<Json<MatrixResponse>, ApiError> {
    check_days(params.days)?;
    let coins = parse_coin_list(&params.coins)?;

    debug!(?coins, days = params.days, "Correlation matrix request");

    // Sequential fetches; the first exhausted coin fails the request
    let mut returns = Vec::with_capacity(coins.len());
    for coin in &coins {
        let prices = app_state
            .fetcher
            .fetch_historical_prices(coin, params.days)
            .await?;
        returns.push(stats::compute_returns(&prices)?);
    }

    let mut matrix = Map::new();
    for (i, coin_a) in coins.iter().enumerate() {
        let mut row = Map::new();
        for (j, coin_b) in coins.iter().enumerate() {
            let corr = stats::pearson_correlation(&returns[i], &returns[j])?;
            row.insert(coin_b.clone(), Value::from(corr));
        }
        matrix.insert(coin_a.clone(), Value::Object(row));
    }

    Ok(Json(MatrixResponse {
        coins,
        days: params.days,
        matrix,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/rolling-correlation - trailing-window correlation of two coins
///
/// Example: /api/rolling-correlation?coin_a=ethereum&coin_b=bitcoin&days=30&window=7
pub async fn rolling_correlation_handler(
    State(app_state): State<AppState>,
    Query(params): Query<RollingQuery>,
) -> Result<Json<RollingResponse>, ApiError> {
    check_days(params.days)?;
    if params.window < 1 {
        return Err(ApiError::BadRequest(
            "window must be at least 1".to_string(),
        ));
    }

    let coin_a = SymbolTable::normalize(&params.coin_a);
    let coin_b = SymbolTable::normalize(&params.coin_b);
    if coin_a.is_empty() || coin_b.is_empty() {
        return Err(ApiError::BadRequest(
            "coin_a and coin_b must be non-empty".to_string(),
        ));
    }

    debug!(%coin_a, %coin_b, days = params.days, window = params.window, "Rolling correlation request");

    let prices_a = app_state
        .fetcher
        .fetch_historical_prices(&coin_a, params.days)
        .await?;
    let prices_b = app_state
        .fetcher
        .fetch_historical_prices(&coin_b, params.days)
        .await?;

    let returns_a = stats::compute_returns(&prices_a)?;
    let returns_b = stats::compute_returns(&prices_b)?;
    let rolling_correlations: Vec<RollingCorrelationPoint> =
        stats::rolling_correlation(&returns_a, &returns_b, params.window)?.collect();

    Ok(Json(RollingResponse {
        coin_a,
        coin_b,
        days: params.days,
        window: params.window,
        rolling_correlations,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/beta - per-coin beta versus the bitcoin benchmark
///
/// Example: /api/beta?coins=ethereum,solana&days=30
pub async fn beta_handler(
    State(app_state): State<AppState>,
    Query(params): Query<BetaQuery>,
) -> Result<Json<BetaResponse>, ApiError> {
    check_days(params.days)?;
    let coins = parse_coin_list(&params.coins)?;

    debug!(?coins, days = params.days, "Beta request");

    let benchmark_prices = app_state
        .fetcher
        .fetch_historical_prices(BENCHMARK_COIN, params.days)
        .await?;
    let benchmark_returns = stats::compute_returns(&benchmark_prices)?;

    let mut betas = Map::new();
    for coin in &coins {
        let prices = app_state
            .fetcher
            .fetch_historical_prices(coin, params.days)
            .await?;
        let returns = stats::compute_returns(&prices)?;
        let beta = stats::compute_beta(&returns, &benchmark_returns)?;
        betas.insert(coin.clone(), Value::from(beta));
    }

    Ok(Json(BetaResponse {
        benchmark: BENCHMARK_COIN,
        days: params.days,
        betas,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// GET /api/coins - coin ids usable with the other endpoints
///
/// Served from a short-TTL cache of the Bitget listing; discovered pairs
/// are appended to the symbol table. Falls back to the symbol table's own
/// ids when Bitget is unavailable.
pub async fn coins_handler(State(app_state): State<AppState>) -> Json<CoinsResponse> {
    if let Some(cache) = app_state.coins_cache.read().await.as_ref() {
        if cache.fetched_at.elapsed() < Duration::from_secs(COINS_CACHE_TTL_SECS) {
            return Json(CoinsResponse {
                count: cache.coins.len(),
                coins: cache.coins.clone(),
                source: "cache",
            });
        }
    }

    match app_state.bitget.list_coins().await {
        Ok(coins) => {
            for coin in &coins {
                let symbol = format!("{}USDT", coin.to_uppercase());
                app_state.symbols.insert(coin, &symbol).await;
            }

            *app_state.coins_cache.write().await = Some(CoinsCache {
                coins: coins.clone(),
                fetched_at: std::time::Instant::now(),
            });

            Json(CoinsResponse {
                count: coins.len(),
                coins,
                source: "bitget",
            })
        }
        Err(err) => {
            warn!(error = %err, "Coin listing failed, serving static symbol table");
            let coins = app_state.symbols.coin_ids().await;
            Json(CoinsResponse {
                count: coins.len(),
                coins,
                source: "static",
            })
        }
    }
}
