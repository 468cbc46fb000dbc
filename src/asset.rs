//! Asset configuration registry
//!
//! Decimal precision is a static property of the asset, looked up by symbol.
//! The registry is the single source of truth the money codec and engines
//! consult; it is loaded from config and immutable afterwards.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::Amount;
use crate::error::LedgerError;

/// Static properties of one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    /// Symbol, e.g. "USDT".
    pub symbol: String,
    /// Minor-unit precision (6 for a stablecoin, 2 for fiat).
    pub decimals: u32,
    /// Smallest transferable amount in minor units (one whole unit typically).
    pub min_transfer: Amount,
    /// Flat withdrawal fee in minor units.
    pub withdraw_fee: Amount,
    /// Withdrawals at or above this start in PENDING_REVIEW instead of PENDING.
    pub review_threshold: Amount,
}

/// Symbol -> AssetInfo lookup.
#[derive(Debug, Default)]
pub struct AssetRegistry {
    assets: FxHashMap<String, AssetInfo>,
}

impl AssetRegistry {
    pub fn new(assets: Vec<AssetInfo>) -> Self {
        let assets = assets
            .into_iter()
            .map(|a| (a.symbol.to_ascii_uppercase(), a))
            .collect();
        Self { assets }
    }

    /// The default asset set the dashboard ships with.
    pub fn builtin() -> Self {
        Self::new(vec![
            AssetInfo {
                symbol: "USDT".into(),
                decimals: 6,
                min_transfer: 1_000_000,          // 1 USDT
                withdraw_fee: 1_000_000,          // 1 USDT flat
                review_threshold: 10_000_000_000, // 10,000 USDT
            },
            AssetInfo {
                symbol: "USD".into(),
                decimals: 2,
                min_transfer: 100,           // $1
                withdraw_fee: 0,
                review_threshold: 1_000_000, // $10,000
            },
        ])
    }

    pub fn get(&self, symbol: &str) -> Result<&AssetInfo, LedgerError> {
        self.assets
            .get(&symbol.to_ascii_uppercase())
            .ok_or_else(|| LedgerError::AssetNotFound(symbol.to_string()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.assets.keys().map(String::as_str)
    }
}

/// Static properties of one investment strategy the engine must know:
/// the minimum ticket. Signal generation lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    pub id: u32,
    pub name: String,
    /// Minimum investment per order, minor units of `asset`.
    pub min_investment: Amount,
    pub asset: String,
}

/// StrategyId -> StrategyInfo lookup.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: FxHashMap<u32, StrategyInfo>,
}

impl StrategyRegistry {
    pub fn new(strategies: Vec<StrategyInfo>) -> Self {
        let strategies = strategies.into_iter().map(|s| (s.id, s)).collect();
        Self { strategies }
    }

    pub fn builtin() -> Self {
        Self::new(vec![
            StrategyInfo {
                id: 1,
                name: "Conservative Yield".into(),
                min_investment: 10_000_000, // 10 USDT
                asset: "USDT".into(),
            },
            StrategyInfo {
                id: 2,
                name: "Momentum".into(),
                min_investment: 100_000_000, // 100 USDT
                asset: "USDT".into(),
            },
        ])
    }

    pub fn get(&self, id: u32) -> Result<&StrategyInfo, LedgerError> {
        self.strategies
            .get(&id)
            .ok_or(LedgerError::StrategyNotFound(id))
    }
}
