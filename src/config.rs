use serde::{Deserialize, Serialize};
use std::fs;

use crate::asset::{AssetInfo, StrategyInfo};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Asset wallets and vaults are denominated in.
    pub base_asset: String,
    /// Cap on FAILED -> PROCESSING retries per withdrawal.
    pub max_withdrawal_retries: u32,
    /// Asset table; empty means the builtin set.
    #[serde(default)]
    pub assets: Vec<AssetInfo>,
    /// Strategy table; empty means the builtin set.
    #[serde(default)]
    pub strategies: Vec<StrategyInfo>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_asset: "USDT".to_string(),
            max_withdrawal_retries: 5,
            assets: Vec::new(),
            strategies: Vec::new(),
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> anyhow::Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {}", config_path, e))?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
