//! Position/Investment Ledger
//!
//! Tracks principal and current value of a user's stake in a strategy.
//! This core only ever ADDS to both fields; performance-driven changes to
//! current value are applied by the performance engine, not here.

use serde::{Deserialize, Serialize};

use crate::core_types::Amount;
use crate::error::LedgerError;

/// A user's stake in one strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    principal_minor: Amount,
    current_value_minor: Amount,
}

impl Position {
    /// First investment into a strategy: value starts equal to principal.
    pub fn open(amount_minor: Amount) -> Self {
        Self {
            principal_minor: amount_minor,
            current_value_minor: amount_minor,
        }
    }

    #[inline(always)]
    pub const fn principal_minor(&self) -> Amount {
        self.principal_minor
    }

    #[inline(always)]
    pub const fn current_value_minor(&self) -> Amount {
        self.current_value_minor
    }

    /// Add new capital: both principal and current value grow by exactly
    /// the invested amount. An investment can never decrease either field.
    pub fn apply_investment(&mut self, amount_minor: Amount) -> Result<(), LedgerError> {
        let principal = self
            .principal_minor
            .checked_add(amount_minor)
            .ok_or(LedgerError::Overflow)?;
        let value = self
            .current_value_minor
            .checked_add(amount_minor)
            .ok_or(LedgerError::Overflow)?;
        self.principal_minor = principal;
        self.current_value_minor = value;
        Ok(())
    }
}
