//! API request/response types, the unified response wrapper, and error codes

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::account::UserAccount;
use crate::error::LedgerError;
use crate::money;
use crate::operation::Operation;
use crate::vault::{Vault, VaultKind};
use crate::withdrawal::Withdrawal;

// ============================================================================
// Unified API Response Format
// ============================================================================

/// Unified API response wrapper
///
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }
}

/// Standard API error codes
pub mod error_codes {
    pub const SUCCESS: i32 = 0;

    // Request shape errors (1xxx)
    pub const INVALID_PARAMETER: i32 = -1001;
    pub const INVALID_AMOUNT: i32 = -1002;
    pub const SAME_LOCATION: i32 = -1004;
    pub const OVERFLOW: i32 = -1006;

    // Balance / business errors (2xxx)
    pub const INSUFFICIENT_BALANCE: i32 = -2001;
    pub const BELOW_MINIMUM: i32 = -2002;
    pub const GATE_BLOCKED: i32 = -2003;

    // Idempotency (3xxx)
    pub const DUPLICATE_REQUEST: i32 = -3001;

    // Identity (4xxx)
    pub const UNAUTHORIZED: i32 = -4001;
    pub const ASSET_NOT_FOUND: i32 = -4404;
    pub const STRATEGY_NOT_FOUND: i32 = -4405;
    pub const WITHDRAWAL_NOT_FOUND: i32 = -4406;
    pub const OPERATION_NOT_FOUND: i32 = -4407;

    // Server (5xxx)
    pub const STORAGE_ERROR: i32 = -5001;

    // Withdrawal workflow (6xxx)
    pub const INVALID_TRANSITION: i32 = -6001;
    pub const RETRY_LIMIT_EXCEEDED: i32 = -6002;
}

/// API error carrying the stable code and the suggested HTTP status.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: error_codes::UNAUTHORIZED,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: error_codes::INVALID_PARAMETER,
            msg: msg.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(e: LedgerError) -> Self {
        let code = match &e {
            LedgerError::InvalidAmount(_) => error_codes::INVALID_AMOUNT,
            LedgerError::InvalidParameter(_) => error_codes::INVALID_PARAMETER,
            LedgerError::InsufficientBalance => error_codes::INSUFFICIENT_BALANCE,
            LedgerError::BelowMinimum => error_codes::BELOW_MINIMUM,
            LedgerError::SameLocation => error_codes::SAME_LOCATION,
            LedgerError::Overflow => error_codes::OVERFLOW,
            LedgerError::InvalidTransition { .. } => error_codes::INVALID_TRANSITION,
            LedgerError::RetryLimitExceeded => error_codes::RETRY_LIMIT_EXCEEDED,
            LedgerError::DuplicateRequest => error_codes::DUPLICATE_REQUEST,
            LedgerError::GateBlocked(_) => error_codes::GATE_BLOCKED,
            LedgerError::AssetNotFound(_) => error_codes::ASSET_NOT_FOUND,
            LedgerError::StrategyNotFound(_) => error_codes::STRATEGY_NOT_FOUND,
            LedgerError::WithdrawalNotFound(_) => error_codes::WITHDRAWAL_NOT_FOUND,
            LedgerError::OperationNotFound(_) => error_codes::OPERATION_NOT_FOUND,
            LedgerError::Unauthorized => error_codes::UNAUTHORIZED,
            LedgerError::Storage(_) => error_codes::STORAGE_ERROR,
        };
        Self {
            status: StatusCode::from_u16(e.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            code,
            msg: format!("{}: {}", e.code(), e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> {
            code: self.code,
            msg: self.msg,
            data: None,
        };
        (self.status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

// ============================================================================
// Request DTOs (amounts are minor-unit integer strings, never floats)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct InvestRequest {
    #[serde(rename = "strategyId")]
    pub strategy_id: u32,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct VaultTransferRequest {
    #[serde(rename = "fromVault")]
    pub from_vault: String,
    #[serde(rename = "toVault")]
    pub to_vault: String,
    pub amount: String,
}

#[derive(Debug, Deserialize)]
pub struct WithdrawRequest {
    pub amount: String,
    pub asset: String,
    pub destination: String,
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct PayoutRequest {
    #[serde(rename = "userId")]
    pub user_id: u64,
    #[serde(rename = "strategyId")]
    pub strategy_id: u32,
    pub amount: String,
}

// ============================================================================
// Response DTOs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct OperationData {
    pub id: String,
    #[serde(rename = "type")]
    pub op_type: String,
    pub status: String,
    /// Minor units, as a string.
    pub amount: String,
    /// Two-decimal human display.
    #[serde(rename = "amountDisplay")]
    pub amount_display: String,
    pub asset: String,
    #[serde(rename = "relatedEntityId", skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    pub replayed: bool,
}

impl OperationData {
    pub fn from_operation(op: &Operation, decimals: u32, replayed: bool) -> Self {
        Self {
            id: op.id.to_string(),
            op_type: op.op_type.to_string(),
            status: op.status.to_string(),
            amount: op.amount.to_string(),
            amount_display: money::format_display(op.amount, decimals),
            asset: op.asset.clone(),
            related_entity_id: op.related_entity_id.clone(),
            created_at: op.created_at,
            replayed,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WithdrawalData {
    pub id: String,
    pub asset: String,
    pub amount: String,
    pub fee: String,
    /// Presentation only; authorization used the unclamped value.
    #[serde(rename = "netReceive")]
    pub net_receive: String,
    pub destination: String,
    pub status: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(rename = "retryCount")]
    pub retry_count: u32,
    #[serde(rename = "allowedTransitions")]
    pub allowed_transitions: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl WithdrawalData {
    pub fn from_withdrawal(w: &Withdrawal) -> Self {
        Self {
            id: w.id.to_string(),
            asset: w.asset.clone(),
            amount: w.amount.to_string(),
            fee: w.fee.to_string(),
            net_receive: money::net_receive_display(w.amount, w.fee).to_string(),
            destination: w.destination.clone(),
            status: w.status.to_string(),
            operation_id: w.operation_id.to_string(),
            retry_count: w.retry_count,
            allowed_transitions: w
                .status
                .allowed_transitions()
                .iter()
                .map(|s| s.to_string())
                .collect(),
            created_at: w.created_at,
            updated_at: w.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VaultData {
    pub kind: String,
    pub balance: String,
    #[serde(rename = "goalAmount", skip_serializing_if = "Option::is_none")]
    pub goal_amount: Option<String>,
    /// Two-decimal percentage, e.g. "30.00".
    pub progress: String,
    #[serde(rename = "autoSweepPct")]
    pub auto_sweep_pct: u8,
    #[serde(rename = "autoSweepEnabled")]
    pub auto_sweep_enabled: bool,
}

impl VaultData {
    fn from_vault(kind: VaultKind, v: &Vault) -> Self {
        Self {
            kind: kind.to_string(),
            balance: v.balance().to_string(),
            goal_amount: v.goal_amount.map(|g| g.to_string()),
            progress: v.progress_display(),
            auto_sweep_pct: v.auto_sweep_pct,
            auto_sweep_enabled: v.auto_sweep_enabled,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PositionData {
    #[serde(rename = "strategyId")]
    pub strategy_id: u32,
    #[serde(rename = "principalMinor")]
    pub principal_minor: String,
    #[serde(rename = "currentValueMinor")]
    pub current_value_minor: String,
}

#[derive(Debug, Serialize)]
pub struct AccountData {
    pub available: String,
    pub locked: String,
    pub total: String,
    pub vaults: Vec<VaultData>,
    pub positions: Vec<PositionData>,
}

impl AccountData {
    pub fn from_account(acc: &UserAccount) -> Self {
        let mut positions: Vec<PositionData> = acc
            .positions
            .iter()
            .map(|(id, p)| PositionData {
                strategy_id: *id,
                principal_minor: p.principal_minor().to_string(),
                current_value_minor: p.current_value_minor().to_string(),
            })
            .collect();
        positions.sort_by_key(|p| p.strategy_id);

        Self {
            available: acc.wallet.available().to_string(),
            locked: acc.wallet.locked().to_string(),
            total: acc.wallet.total().map(|t| t.to_string()).unwrap_or_default(),
            vaults: VaultKind::ALL
                .iter()
                .map(|kind| VaultData::from_vault(*kind, acc.vaults.get(*kind)))
                .collect(),
            positions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let api: ApiError = LedgerError::InsufficientBalance.into();
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.code, error_codes::INSUFFICIENT_BALANCE);
        assert!(api.msg.starts_with("INSUFFICIENT_BALANCE"));
    }

    #[test]
    fn test_invalid_transition_is_client_error() {
        use crate::withdrawal::WithdrawalStatus;
        let api: ApiError = LedgerError::InvalidTransition {
            from: WithdrawalStatus::Completed,
            to: WithdrawalStatus::Processing,
        }
        .into();
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert_eq!(api.code, error_codes::INVALID_TRANSITION);
    }

    #[test]
    fn test_request_dto_field_names() {
        let req: VaultTransferRequest = serde_json::from_str(
            r#"{"fromVault":"wallet","toVault":"principal","amount":"1000000"}"#,
        )
        .unwrap();
        assert_eq!(req.from_vault, "wallet");
        assert_eq!(req.amount, "1000000");
    }
}
