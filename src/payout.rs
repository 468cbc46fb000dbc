//! Daily Payout Applier ("Model A" accounting)
//!
//! Accrued profit is credited to the wallet balance; invested principal and
//! current value stay untouched. The payout is NEW value entering the user's
//! total holdings, not a reallocation.

use crate::core_types::Amount;
use crate::error::LedgerError;

/// Inputs to one payout application.
#[derive(Debug, Clone, Copy)]
pub struct PayoutInput {
    pub position_current_value: Amount,
    pub balance_available: Amount,
    pub payout_amount: Amount,
}

/// The committed result of a payout application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayoutOutcome {
    pub position_current_value: Amount,
    pub balance_available: Amount,
}

/// Apply a daily payout to the wallet.
///
/// Invariant: `position_after + balance_after ==
/// position_before + balance_before + payout_amount`.
pub fn apply_daily_payout(input: PayoutInput) -> Result<PayoutOutcome, LedgerError> {
    let balance_available = input
        .balance_available
        .checked_add(input.payout_amount)
        .ok_or(LedgerError::Overflow)?;
    Ok(PayoutOutcome {
        position_current_value: input.position_current_value,
        balance_available,
    })
}
