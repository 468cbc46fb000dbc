//! Enforced wallet Balance type
//!
//! The SINGLE source of truth for wallet balance mutations.
//! ALL balance changes MUST go through these methods.
//!
//! # Enforcement Strategy:
//! 1. Fields are PRIVATE - no direct access
//! 2. All mutations return Result - errors are explicit
//! 3. Version auto-increments - audit trail
//! 4. checked_add/sub - overflow protection

use serde::{Deserialize, Serialize};

use crate::core_types::Amount;
use crate::error::LedgerError;

/// Wallet balance for a single (user, asset)
///
/// # Invariants (enforced by private fields):
/// - `available >= 0` and `locked >= 0` (unsigned by construction)
/// - `total = available + locked` is derived, never stored
/// - Underflow is rejected, not clamped
/// - Every state change increments `version`
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Balance {
    available: Amount, // PRIVATE - only via deposit/debit/lock/unlock
    locked: Amount,    // PRIVATE - only via lock/unlock/spend_locked
    version: u64,      // PRIVATE - incremented on every mutation
}

impl Balance {
    // ============================================================
    // READ-ONLY GETTERS
    // ============================================================

    #[inline(always)]
    pub const fn available(&self) -> Amount {
        self.available
    }

    #[inline(always)]
    pub const fn locked(&self) -> Amount {
        self.locked
    }

    /// Total balance (available + locked). Informational only.
    /// Returns None on overflow (indicates data corruption).
    #[inline(always)]
    pub const fn total(&self) -> Option<Amount> {
        self.available.checked_add(self.locked)
    }

    #[inline(always)]
    pub const fn version(&self) -> u64 {
        self.version
    }

    // ============================================================
    // VALIDATED MUTATIONS
    // ============================================================

    /// Credit funds to available balance.
    pub fn deposit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Debit funds from available balance.
    ///
    /// Rejects with `InsufficientBalance` rather than clamping.
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.available < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.available -= amount;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Reserve funds (move from available to locked).
    ///
    /// Used when a withdrawal enters its approval-pending lifecycle.
    pub fn lock(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.available < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.available -= amount;
        self.locked = self
            .locked
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Release reserved funds (move from locked back to available).
    ///
    /// Used when a withdrawal is rejected or cancelled before processing.
    pub fn unlock(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.locked < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.locked -= amount;
        self.available = self
            .available
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }

    /// Spend reserved funds (remove from locked, funds leave the wallet).
    ///
    /// Used when a withdrawal reaches PROCESSING.
    pub fn spend_locked(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.locked < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.locked -= amount;
        self.version = self.version.wrapping_add(1);
        Ok(())
    }
}

// ============================================================
// TESTS - prove enforcement works
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deposit() {
        let mut bal = Balance::default();
        assert_eq!(bal.available(), 0);

        bal.deposit(100).unwrap();
        assert_eq!(bal.available(), 100);
        assert_eq!(bal.version(), 1);

        bal.deposit(50).unwrap();
        assert_eq!(bal.available(), 150);
        assert_eq!(bal.version(), 2);
    }

    #[test]
    fn test_deposit_overflow() {
        let mut bal = Balance::default();
        bal.deposit(u128::MAX).unwrap();
        assert_eq!(bal.deposit(1), Err(LedgerError::Overflow));
    }

    #[test]
    fn test_debit_insufficient() {
        let mut bal = Balance::default();
        bal.deposit(50).unwrap();

        assert_eq!(bal.debit(100), Err(LedgerError::InsufficientBalance));
        assert_eq!(bal.available(), 50); // unchanged
        assert_eq!(bal.version(), 1); // no mutation on failure
    }

    #[test]
    fn test_lock_unlock() {
        let mut bal = Balance::default();
        bal.deposit(100).unwrap();

        bal.lock(60).unwrap();
        assert_eq!(bal.available(), 40);
        assert_eq!(bal.locked(), 60);
        assert_eq!(bal.total(), Some(100)); // total unchanged by lock

        bal.unlock(20).unwrap();
        assert_eq!(bal.available(), 60);
        assert_eq!(bal.locked(), 40);
    }

    #[test]
    fn test_lock_insufficient() {
        let mut bal = Balance::default();
        bal.deposit(10).unwrap();
        assert_eq!(bal.lock(11), Err(LedgerError::InsufficientBalance));
        assert_eq!(bal.available(), 10);
        assert_eq!(bal.locked(), 0);
    }

    #[test]
    fn test_spend_locked() {
        let mut bal = Balance::default();
        bal.deposit(100).unwrap();
        bal.lock(60).unwrap();

        bal.spend_locked(60).unwrap();
        assert_eq!(bal.locked(), 0);
        assert_eq!(bal.available(), 40); // unchanged
        assert_eq!(bal.total(), Some(40)); // funds left the wallet
    }

    #[test]
    fn test_spend_locked_insufficient() {
        let mut bal = Balance::default();
        bal.deposit(100).unwrap();
        bal.lock(30).unwrap();
        assert_eq!(bal.spend_locked(31), Err(LedgerError::InsufficientBalance));
        assert_eq!(bal.locked(), 30);
    }
}
