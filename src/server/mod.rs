pub mod api;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::error::Result;
use crate::services::{BitgetClient, PriceFetcher, SymbolTable};

/// Coin listing fetched from Bitget, kept until the TTL expires.
pub struct CoinsCache {
    pub coins: Vec<String>,
    pub fetched_at: Instant,
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<PriceFetcher>,
    pub symbols: Arc<SymbolTable>,
    /// Dedicated Bitget client for coin discovery; price fetching goes
    /// through `fetcher`.
    pub bitget: Arc<BitgetClient>,
    pub coins_cache: Arc<RwLock<Option<CoinsCache>>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let symbols = Arc::new(SymbolTable::new());
        let fetcher = Arc::new(PriceFetcher::from_config(config, symbols.clone())?);
        let bitget = Arc::new(BitgetClient::new(
            config.bitget_base_url.clone(),
            Duration::from_secs(config.provider_timeout_secs),
            symbols.clone(),
        )?);

        Ok(Self {
            fetcher,
            symbols,
            bitget,
            coins_cache: Arc::new(RwLock::new(None)),
            started_at: Instant::now(),
        })
    }
}

/// Build the router for the given state.
pub fn build_router(app_state: AppState) -> Router {
    // Read-only API, so any origin may call it
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([axum::http::Method::GET, axum::http::Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(api::root_handler))
        .route("/health", get(api::health_handler))
        .route("/api/correlation-matrix", get(api::correlation_matrix_handler))
        .route("/api/rolling-correlation", get(api::rolling_correlation_handler))
        .route("/api/beta", get(api::beta_handler))
        .route("/api/coins", get(api::coins_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(config: AppConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    tracing::info!("Starting coincorr server");
    tracing::info!(
        providers = ?config
            .provider_order
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>(),
        timeout_secs = config.provider_timeout_secs,
        "Provider fallback order"
    );

    let port = config.port;
    let app_state = AppState::new(&config)?;

    tracing::info!("Registering routes:");
    tracing::info!("  GET /");
    tracing::info!("  GET /health");
    tracing::info!("  GET /api/correlation-matrix?coins=bitcoin,ethereum&days=30");
    tracing::info!("  GET /api/rolling-correlation?coin_a=ethereum&coin_b=bitcoin&days=30&window=7");
    tracing::info!("  GET /api/beta?coins=ethereum,solana&days=30");
    tracing::info!("  GET /api/coins");

    let app = build_router(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "Server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
