pub mod binance;
pub mod bitget;
pub mod coingecko;
pub mod fetcher;
pub mod provider;
pub mod symbols;

pub use binance::BinanceClient;
pub use bitget::BitgetClient;
pub use coingecko::CoinGeckoClient;
pub use fetcher::PriceFetcher;
pub use provider::{AllProvidersFailed, PriceProvider, ProviderError, ProviderErrorKind};
pub use symbols::SymbolTable;
