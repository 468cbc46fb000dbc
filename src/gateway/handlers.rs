//! HTTP handlers for the ledger engine
//!
//! Identity comes from the `X-User-Id` header (authentication lives in the
//! surrounding shell). The `Idempotency-Key` header is honored on every
//! mutating endpoint; omitting it forfeits the at-most-once guarantee for
//! that call.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;

use super::state::AppState;
use super::types::{
    AccountData, ApiError, ApiResult, DepositRequest, InvestRequest, OperationData,
    PayoutRequest, TransitionRequest, VaultTransferRequest, WithdrawRequest, WithdrawalData, ok,
};
use crate::core_types::{UserId, WithdrawalId};
use crate::idempotency::IdempotencyKey;
use crate::money;
use crate::vault::VaultLocation;
use crate::withdrawal::WithdrawalStatus;

/// Extract the authenticated user id passed through by the shell.
fn user_id(headers: &HeaderMap) -> Result<UserId, ApiError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<UserId>().ok())
        .ok_or_else(|| ApiError::unauthorized("missing or malformed X-User-Id header"))
}

/// Extract the optional idempotency token.
fn idempotency_key(headers: &HeaderMap) -> Option<IdempotencyKey> {
    headers
        .get("idempotency-key")
        .and_then(|v| v.to_str().ok())
        .and_then(IdempotencyKey::new)
}

fn display_decimals(state: &AppState, asset: &str) -> u32 {
    state
        .engine
        .assets()
        .get(asset)
        .map(|a| a.decimals)
        .unwrap_or(0)
}

/// POST /api/deposit/usdt/simulate
pub async fn deposit_simulate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<DepositRequest>,
) -> ApiResult<OperationData> {
    let user = user_id(&headers)?;
    let key = idempotency_key(&headers);
    let amount = money::parse_minor_string(&req.amount)
        .map_err(crate::error::LedgerError::from)?;

    let outcome = state.engine.deposit(user, amount, key)?;
    let decimals = display_decimals(&state, &outcome.operation.asset);
    ok(OperationData::from_operation(
        &outcome.operation,
        decimals,
        outcome.replayed,
    ))
}

/// POST /api/invest
pub async fn invest(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<InvestRequest>,
) -> ApiResult<OperationData> {
    let user = user_id(&headers)?;
    let key = idempotency_key(&headers);
    let amount = money::parse_minor_string(&req.amount)
        .map_err(crate::error::LedgerError::from)?;

    let outcome = state.engine.invest(user, req.strategy_id, amount, key)?;
    let decimals = display_decimals(&state, &outcome.operation.asset);
    ok(OperationData::from_operation(
        &outcome.operation,
        decimals,
        outcome.replayed,
    ))
}

/// POST /api/vault/transfer
pub async fn vault_transfer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<VaultTransferRequest>,
) -> ApiResult<OperationData> {
    let user = user_id(&headers)?;
    let key = idempotency_key(&headers);
    let from: VaultLocation = req.from_vault.parse()?;
    let to: VaultLocation = req.to_vault.parse()?;
    let amount = money::parse_minor_string(&req.amount)
        .map_err(crate::error::LedgerError::from)?;

    let outcome = state.engine.vault_transfer(user, from, to, amount, key)?;
    let decimals = display_decimals(&state, &outcome.operation.asset);
    ok(OperationData::from_operation(
        &outcome.operation,
        decimals,
        outcome.replayed,
    ))
}

/// POST /api/withdraw
pub async fn submit_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<WithdrawRequest>,
) -> ApiResult<WithdrawalData> {
    let user = user_id(&headers)?;
    let key = idempotency_key(&headers);
    let amount = money::parse_minor_string(&req.amount)
        .map_err(crate::error::LedgerError::from)?;

    let (withdrawal, _outcome) =
        state
            .engine
            .submit_withdrawal(user, &req.asset, amount, &req.destination, key)?;
    ok(WithdrawalData::from_withdrawal(&withdrawal))
}

/// GET /api/withdraw/{id}
pub async fn get_withdrawal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> ApiResult<WithdrawalData> {
    let user = user_id(&headers)?;
    let id: WithdrawalId = id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed withdrawal id"))?;
    let w = state.engine.store().get_withdrawal(id)?;
    if w.user_id != user {
        // Do not leak other users' withdrawal ids
        return Err(crate::error::LedgerError::WithdrawalNotFound(id.to_string()).into());
    }
    ok(WithdrawalData::from_withdrawal(&w))
}

/// GET /api/withdrawals
pub async fn list_withdrawals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<WithdrawalData>> {
    let user = user_id(&headers)?;
    let rows = state.engine.store().list_withdrawals(user);
    ok(rows.iter().map(WithdrawalData::from_withdrawal).collect())
}

/// POST /api/admin/withdraw/{id}/status
///
/// Operator tooling; the shell guards access. An out-of-table transition is
/// a client error, not a server fault.
pub async fn admin_transition_withdrawal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> ApiResult<WithdrawalData> {
    let id: WithdrawalId = id
        .parse()
        .map_err(|_| ApiError::bad_request("malformed withdrawal id"))?;
    let to: WithdrawalStatus = req
        .status
        .parse()
        .map_err(|e: String| ApiError::bad_request(e))?;

    let w = state.engine.transition_withdrawal(id, to)?;
    ok(WithdrawalData::from_withdrawal(&w))
}

/// POST /api/admin/payout
///
/// Invoked by the payout scheduler, one atomic credit per call.
pub async fn admin_apply_payout(
    State(state): State<AppState>,
    Json(req): Json<PayoutRequest>,
) -> ApiResult<OperationData> {
    let amount = money::parse_minor_string(&req.amount)
        .map_err(crate::error::LedgerError::from)?;
    let outcome = state
        .engine
        .apply_daily_payout(req.user_id, req.strategy_id, amount)?;
    let decimals = display_decimals(&state, &outcome.operation.asset);
    ok(OperationData::from_operation(
        &outcome.operation,
        decimals,
        outcome.replayed,
    ))
}

/// GET /api/account
pub async fn get_account(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<AccountData> {
    let user = user_id(&headers)?;
    let snapshot = state.engine.account_snapshot(user);
    ok(AccountData::from_account(&snapshot))
}

/// GET /api/operations
pub async fn list_operations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Vec<OperationData>> {
    let user = user_id(&headers)?;
    let ops = state.engine.store().operations.list_for_user(user);
    ok(ops
        .iter()
        .map(|op| {
            let decimals = display_decimals(&state, &op.asset);
            OperationData::from_operation(op, decimals, false)
        })
        .collect())
}

/// GET /api/v1/health
pub async fn health_check() -> ApiResult<serde_json::Value> {
    ok(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
