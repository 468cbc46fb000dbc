//! Core types used throughout the ledger engine
//!
//! Fundamental aliases and id newtypes shared by all modules.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// User ID - globally unique, immutable after assignment.
///
/// Assigned by the surrounding account shell; this engine only keys on it.
pub type UserId = u64;

/// Strategy ID - identifies an investment strategy.
pub type StrategyId = u32;

/// Monetary amount in minor units (e.g. micro-USDT, cents).
///
/// 128-bit so that conservation sums over many balances cannot overflow in
/// practice. No floating point ever touches a value of this type.
pub type Amount = u128;

/// Operation ID - ULID-based unique identifier for ledger operations.
///
/// ULID gives monotonic, sortable ids with no coordination needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(ulid::Ulid);

impl OperationId {
    /// Generate a new unique OperationId
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for OperationId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}

/// Withdrawal ID - ULID-based unique identifier for withdrawal requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WithdrawalId(ulid::Ulid);

impl WithdrawalId {
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    pub fn inner(&self) -> ulid::Ulid {
        self.0
    }
}

impl Default for WithdrawalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WithdrawalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WithdrawalId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(ulid::Ulid::from_string(s)?))
    }
}
