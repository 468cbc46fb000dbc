//! fincore - Ledger & Transfer Engine
//!
//! Integer-money bookkeeping for a savings product: wallet, named vaults,
//! strategy positions, withdrawals with an approval pipeline, and an
//! idempotent operation log behind an HTTP gateway.
//!
//! # Modules
//!
//! - [`core_types`] - Core type definitions (UserId, Amount, ids)
//! - [`money`] - Decimal-text to minor-unit codec
//! - [`balance`] - Enforced balance type (available / locked)
//! - [`vault`] - Named vaults and transfer locations
//! - [`position`] - Per-strategy principal tracking
//! - [`payout`] - Daily payout arithmetic
//! - [`account`] - Per-user account aggregate
//! - [`asset`] - Asset and strategy registries
//! - [`operation`] - Append-only operation log
//! - [`idempotency`] - Client-key replay guard
//! - [`withdrawal`] - Withdrawal records and status machine
//! - [`gate`] - Investment eligibility hook
//! - [`store`] - In-memory ledger store
//! - [`engine`] - Ledger engine (all state mutations)
//! - [`gateway`] - HTTP API

pub mod core_types;

pub mod account;
pub mod asset;
pub mod balance;
pub mod config;
pub mod engine;
pub mod error;
pub mod gate;
pub mod gateway;
pub mod idempotency;
pub mod logging;
pub mod money;
pub mod operation;
pub mod payout;
pub mod position;
pub mod store;
pub mod vault;
pub mod withdrawal;

// Convenient re-exports at crate root
pub use balance::Balance;
pub use core_types::{Amount, OperationId, StrategyId, UserId, WithdrawalId};
pub use engine::{LedgerEngine, OperationOutcome};
pub use error::LedgerError;
pub use idempotency::{IdempotencyGuard, IdempotencyKey};
pub use operation::{Operation, OperationStatus, OperationType};
pub use store::LedgerStore;
pub use vault::{Vault, VaultKind, VaultLocation};
pub use withdrawal::{Withdrawal, WithdrawalStatus};
