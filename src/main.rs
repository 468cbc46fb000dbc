//! fincore - Ledger & Transfer Engine entry point
//!
//! Loads config for the requested environment, wires the in-memory store
//! and engine, and serves the HTTP gateway.

use std::sync::Arc;

use fincore::asset::{AssetRegistry, StrategyRegistry};
use fincore::config::AppConfig;
use fincore::gate::AllowAll;
use fincore::gateway::{self, state::AppState};
use fincore::logging::init_logging;
use fincore::{LedgerEngine, LedgerStore};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--env" && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    std::env::var("FINCORE_ENV").unwrap_or_else(|_| "dev".to_string())
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let app_config = AppConfig::load(&env)?;
    let _log_guard = init_logging(&app_config);

    tracing::info!("Starting fincore ledger engine in {} mode", env);

    let ledger = &app_config.ledger;
    let assets = if ledger.assets.is_empty() {
        AssetRegistry::builtin()
    } else {
        AssetRegistry::new(ledger.assets.clone())
    };
    let strategies = if ledger.strategies.is_empty() {
        StrategyRegistry::builtin()
    } else {
        StrategyRegistry::new(ledger.strategies.clone())
    };

    let store = Arc::new(LedgerStore::new());
    let engine = Arc::new(LedgerEngine::new(
        store,
        Arc::new(assets),
        Arc::new(strategies),
        Arc::new(AllowAll),
        ledger.base_asset.clone(),
        ledger.max_withdrawal_retries,
    ));

    let port = get_port_override().unwrap_or(app_config.gateway.port);
    tracing::info!("Gateway will listen on {}:{}", app_config.gateway.host, port);

    gateway::serve(AppState::new(engine), &app_config.gateway.host, port).await
}
