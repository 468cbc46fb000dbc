//! Ledger Error Types
//!
//! Every business-rule violation maps to a stable code the UI can key on.
//! Violations are detected before any mutation is committed; only
//! infrastructure failures surface as 5xx.

use thiserror::Error;

use crate::money::MoneyError;
use crate::withdrawal::WithdrawalStatus;

/// Ledger engine error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // === Validation Errors ===
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient balance")]
    InsufficientBalance,

    #[error("Amount below minimum transfer threshold")]
    BelowMinimum,

    #[error("Source and destination must differ")]
    SameLocation,

    #[error("Amount would cause overflow")]
    Overflow,

    // === State machine ===
    #[error("Invalid withdrawal transition: {from} -> {to}")]
    InvalidTransition {
        from: WithdrawalStatus,
        to: WithdrawalStatus,
    },

    #[error("Withdrawal retry limit exceeded")]
    RetryLimitExceeded,

    // === Idempotency ===
    /// Not a failure: resolved by replaying the original Operation.
    #[error("Duplicate request (idempotency key already recorded)")]
    DuplicateRequest,

    // === Collaborator gates ===
    #[error("Operation blocked by gate: {0}")]
    GateBlocked(String),

    // === Lookup Errors ===
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    #[error("Strategy not found: {0}")]
    StrategyNotFound(u32),

    #[error("Withdrawal not found: {0}")]
    WithdrawalNotFound(String),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    // === Identity ===
    #[error("User not authenticated")]
    Unauthorized,

    // === System ===
    #[error("Storage error: {0}")]
    Storage(String),
}

impl LedgerError {
    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InvalidAmount(_) => "INVALID_AMOUNT",
            LedgerError::InvalidParameter(_) => "INVALID_PARAMETER",
            LedgerError::InsufficientBalance => "INSUFFICIENT_BALANCE",
            LedgerError::BelowMinimum => "BELOW_MINIMUM",
            LedgerError::SameLocation => "SAME_LOCATION",
            LedgerError::Overflow => "OVERFLOW",
            LedgerError::InvalidTransition { .. } => "INVALID_TRANSITION",
            LedgerError::RetryLimitExceeded => "RETRY_LIMIT_EXCEEDED",
            LedgerError::DuplicateRequest => "DUPLICATE_REQUEST",
            LedgerError::GateBlocked(_) => "GATE_BLOCKED",
            LedgerError::AssetNotFound(_) => "ASSET_NOT_FOUND",
            LedgerError::StrategyNotFound(_) => "STRATEGY_NOT_FOUND",
            LedgerError::WithdrawalNotFound(_) => "WITHDRAWAL_NOT_FOUND",
            LedgerError::OperationNotFound(_) => "OPERATION_NOT_FOUND",
            LedgerError::Unauthorized => "UNAUTHORIZED",
            LedgerError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// HTTP status code suggestion
    pub fn http_status(&self) -> u16 {
        match self {
            LedgerError::Unauthorized => 401,
            LedgerError::InvalidAmount(_)
            | LedgerError::InvalidParameter(_)
            | LedgerError::SameLocation
            | LedgerError::Overflow
            | LedgerError::InvalidTransition { .. }
            | LedgerError::DuplicateRequest => 400,
            LedgerError::InsufficientBalance
            | LedgerError::BelowMinimum
            | LedgerError::RetryLimitExceeded
            | LedgerError::GateBlocked(_) => 422,
            LedgerError::AssetNotFound(_)
            | LedgerError::StrategyNotFound(_)
            | LedgerError::WithdrawalNotFound(_)
            | LedgerError::OperationNotFound(_) => 404,
            LedgerError::Storage(_) => 500,
        }
    }
}

impl From<MoneyError> for LedgerError {
    fn from(e: MoneyError) -> Self {
        LedgerError::InvalidAmount(e.to_string())
    }
}

impl From<anyhow::Error> for LedgerError {
    fn from(e: anyhow::Error) -> Self {
        LedgerError::Storage(e.to_string())
    }
}
