//! Coin-id to trading-symbol resolution.
//!
//! Binance and Bitget address markets by trading symbol ("BTCUSDT") while
//! the public API and CoinGecko use coin ids ("bitcoin"). The table is
//! seeded from the built-in mapping and extended at runtime with pairs
//! discovered through the Bitget coin listing.

use std::collections::HashMap;

use tokio::sync::RwLock;

use crate::constants::DEFAULT_SYMBOLS;

pub struct SymbolTable {
    entries: RwLock<HashMap<String, String>>,
}

impl SymbolTable {
    /// Create a table seeded with the built-in mappings.
    pub fn new() -> Self {
        let entries = DEFAULT_SYMBOLS
            .iter()
            .map(|(id, symbol)| (id.to_string(), symbol.to_string()))
            .collect();
        Self {
            entries: RwLock::new(entries),
        }
    }

    /// Normalize a user-supplied coin id: trim, lowercase, spaces to hyphens.
    pub fn normalize(coin_id: &str) -> String {
        coin_id.trim().to_lowercase().replace(' ', "-")
    }

    /// Resolve a coin id to its USDT trading symbol.
    ///
    /// Ids without a table entry resolve to the synthetic
    /// `UPPER(id) + "USDT"`. The guess may name a market that does not
    /// exist; providers report that as an error or empty response.
    pub async fn resolve(&self, coin_id: &str) -> String {
        let normalized = Self::normalize(coin_id);
        if let Some(symbol) = self.entries.read().await.get(&normalized) {
            return symbol.clone();
        }
        format!("{}USDT", normalized.to_uppercase())
    }

    /// Record a discovered pair. Later writes win.
    pub async fn insert(&self, coin_id: &str, symbol: &str) {
        let normalized = Self::normalize(coin_id);
        self.entries
            .write()
            .await
            .insert(normalized, symbol.to_string());
    }

    /// Known coin ids, sorted, used as the static coin-listing fallback.
    pub async fn coin_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.entries.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
