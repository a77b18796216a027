//! Shared constants: provider endpoints, request defaults, and the
//! built-in coin-id to trading-symbol table.

/// Browser-like User-Agent sent with every provider request.
/// Binance and Bitget throttle the default HTTP client agent.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Default listen port for the HTTP server.
pub const DEFAULT_PORT: u16 = 8000;

/// Per-request timeout applied to every provider client, in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;

/// Default provider fallback order, first entry tried first.
pub const DEFAULT_PROVIDER_ORDER: &[&str] = &["binance", "coingecko", "bitget"];

/// Default history window for every endpoint, in days.
pub const DEFAULT_DAYS: u32 = 30;

/// Default rolling-correlation window, in return days.
pub const DEFAULT_WINDOW: usize = 7;

/// Benchmark coin for beta calculations.
pub const BENCHMARK_COIN: &str = "bitcoin";

/// Default coin list for the correlation-matrix endpoint.
pub const DEFAULT_MATRIX_COINS: &str = "bitcoin,ethereum,solana";

/// Default coin list for the beta endpoint; the benchmark itself is
/// fetched separately.
pub const DEFAULT_BETA_COINS: &str = "ethereum,solana";

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";
pub const BITGET_BASE_URL: &str = "https://api.bitget.com";

/// Milliseconds in one day, used to size candle request windows.
pub const MS_PER_DAY: i64 = 86_400_000;

/// How long the coin listing is served from cache before Bitget is
/// queried again, in seconds.
pub const COINS_CACHE_TTL_SECS: u64 = 300;

/// Built-in coin-id to trading-symbol mappings.
///
/// Covers the majors so correlation requests work without ever hitting
/// the Bitget coin listing. Ids missing here resolve to the synthetic
/// `UPPER(id) + "USDT"` form.
pub const DEFAULT_SYMBOLS: &[(&str, &str)] = &[
    ("bitcoin", "BTCUSDT"),
    ("ethereum", "ETHUSDT"),
    ("solana", "SOLUSDT"),
    ("cardano", "ADAUSDT"),
    ("polkadot", "DOTUSDT"),
    ("avalanche", "AVAXUSDT"),
    ("polygon", "MATICUSDT"),
    ("chainlink", "LINKUSDT"),
    ("stellar", "XLMUSDT"),
    ("cosmos", "ATOMUSDT"),
    ("algorand", "ALGOUSDT"),
    ("near", "NEARUSDT"),
    ("aptos", "APTUSDT"),
    ("sui", "SUIUSDT"),
    ("arbitrum", "ARBUSDT"),
    ("optimism", "OPUSDT"),
    ("uniswap", "UNIUSDT"),
    ("aave", "AAVEUSDT"),
    ("binancecoin", "BNBUSDT"),
    ("ripple", "XRPUSDT"),
    ("dogecoin", "DOGEUSDT"),
    ("shiba-inu", "SHIBUSDT"),
    ("tron", "TRXUSDT"),
    ("litecoin", "LTCUSDT"),
];
