//! HTTP gateway
//!
//! Thin axum layer over [`crate::engine::LedgerEngine`]. Handlers translate
//! wire types to engine calls and map [`crate::error::LedgerError`] to the
//! shared `{code, msg, data}` envelope.

pub mod handlers;
pub mod state;
pub mod types;

use std::net::SocketAddr;

use axum::routing::{get, post};
use axum::Router;
use tracing::info;

use state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(handlers::health_check))
        .route(
            "/api/deposit/usdt/simulate",
            post(handlers::deposit_simulate),
        )
        .route("/api/invest", post(handlers::invest))
        .route("/api/vault/transfer", post(handlers::vault_transfer))
        .route("/api/withdraw", post(handlers::submit_withdrawal))
        .route("/api/withdraw/{id}", get(handlers::get_withdrawal))
        .route("/api/withdrawals", get(handlers::list_withdrawals))
        .route("/api/account", get(handlers::get_account))
        .route("/api/operations", get(handlers::list_operations))
        .route(
            "/api/admin/withdraw/{id}/status",
            post(handlers::admin_transition_withdrawal),
        )
        .route("/api/admin/payout", post(handlers::admin_apply_payout))
        .with_state(state)
}

pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let app = build_router(state);

    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
