//! Vaults - named sub-accounts under a user's wallet
//!
//! Three fixed kinds (principal / profit / taxes) segregate funds by purpose.
//! Goal progress is computed with integer arithmetic only, so repeated
//! transfers never accumulate rounding drift.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core_types::Amount;
use crate::error::LedgerError;
use crate::money;

/// The three vault kinds a user owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultKind {
    Principal,
    Profit,
    Taxes,
}

impl VaultKind {
    pub const ALL: [VaultKind; 3] = [VaultKind::Principal, VaultKind::Profit, VaultKind::Taxes];

    pub fn as_str(&self) -> &'static str {
        match self {
            VaultKind::Principal => "principal",
            VaultKind::Profit => "profit",
            VaultKind::Taxes => "taxes",
        }
    }
}

impl fmt::Display for VaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VaultKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "principal" => Ok(VaultKind::Principal),
            "profit" => Ok(VaultKind::Profit),
            "taxes" => Ok(VaultKind::Taxes),
            other => Err(LedgerError::InvalidParameter(format!(
                "unknown vault kind: {}",
                other
            ))),
        }
    }
}

/// A transfer location: the wallet or one of the vaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultLocation {
    Wallet,
    Principal,
    Profit,
    Taxes,
}

impl VaultLocation {
    /// The vault kind behind this location, if it is a vault.
    pub fn vault_kind(&self) -> Option<VaultKind> {
        match self {
            VaultLocation::Wallet => None,
            VaultLocation::Principal => Some(VaultKind::Principal),
            VaultLocation::Profit => Some(VaultKind::Profit),
            VaultLocation::Taxes => Some(VaultKind::Taxes),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VaultLocation::Wallet => "wallet",
            VaultLocation::Principal => "principal",
            VaultLocation::Profit => "profit",
            VaultLocation::Taxes => "taxes",
        }
    }
}

impl fmt::Display for VaultLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VaultLocation {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wallet" => Ok(VaultLocation::Wallet),
            "principal" => Ok(VaultLocation::Principal),
            "profit" => Ok(VaultLocation::Profit),
            "taxes" => Ok(VaultLocation::Taxes),
            other => Err(LedgerError::InvalidParameter(format!(
                "unknown transfer location: {}",
                other
            ))),
        }
    }
}

/// One vault sub-account.
///
/// `goal_amount`, when set, drives the progress display; `auto_sweep_pct`
/// is configuration the sweep scheduler (a collaborator) reads.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vault {
    balance: Amount,
    pub goal_amount: Option<Amount>,
    pub auto_sweep_pct: u8,
    pub auto_sweep_enabled: bool,
}

impl Vault {
    pub fn with_goal(goal_amount: Amount) -> Self {
        Self {
            goal_amount: (goal_amount > 0).then_some(goal_amount),
            ..Self::default()
        }
    }

    #[inline(always)]
    pub const fn balance(&self) -> Amount {
        self.balance
    }

    /// Credit the vault.
    pub fn credit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(LedgerError::Overflow)?;
        Ok(())
    }

    /// Debit the vault. Rejected, never clamped.
    pub fn debit(&mut self, amount: Amount) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }
        self.balance -= amount;
        Ok(())
    }

    /// Goal progress in basis points (1 bps = 0.01%).
    ///
    /// `balance * 10000 / goal`, integer arithmetic throughout. Clamped at
    /// 10000 for display so an overfunded vault reads 100.00%.
    pub fn progress_bps(&self) -> u64 {
        match self.goal_amount {
            Some(goal) if goal > 0 => {
                let bps = self.balance.saturating_mul(10_000) / goal;
                bps.min(10_000) as u64
            }
            _ => 0,
        }
    }

    /// Two-decimal percentage string for the dashboard ("30.00").
    pub fn progress_display(&self) -> String {
        money::format_amount(self.progress_bps() as Amount, 2, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vault_kind_roundtrip() {
        for kind in VaultKind::ALL {
            let parsed: VaultKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("retirement".parse::<VaultKind>().is_err());
    }

    #[test]
    fn test_location_parse() {
        assert_eq!("wallet".parse::<VaultLocation>().unwrap(), VaultLocation::Wallet);
        assert_eq!("PROFIT".parse::<VaultLocation>().unwrap(), VaultLocation::Profit);
        assert_eq!(VaultLocation::Wallet.vault_kind(), None);
        assert_eq!(
            VaultLocation::Taxes.vault_kind(),
            Some(VaultKind::Taxes)
        );
    }

    #[test]
    fn test_credit_debit() {
        let mut v = Vault::default();
        v.credit(500).unwrap();
        assert_eq!(v.balance(), 500);

        v.debit(200).unwrap();
        assert_eq!(v.balance(), 300);

        assert_eq!(v.debit(301), Err(LedgerError::InsufficientBalance));
        assert_eq!(v.balance(), 300);
    }

    #[test]
    fn test_progress_integer_exact() {
        // balance 3_000_000 against goal 10_000_000 -> 30.00%
        let mut v = Vault::with_goal(10_000_000);
        v.credit(3_000_000).unwrap();
        assert_eq!(v.progress_bps(), 3_000);
        assert_eq!(v.progress_display(), "30.00");
    }

    #[test]
    fn test_progress_no_goal_is_zero() {
        let mut v = Vault::default();
        v.credit(1_000).unwrap();
        assert_eq!(v.progress_bps(), 0);
        assert_eq!(v.progress_display(), "0.00");
    }

    #[test]
    fn test_progress_clamps_overfunded() {
        let mut v = Vault::with_goal(100);
        v.credit(250).unwrap();
        assert_eq!(v.progress_bps(), 10_000);
        assert_eq!(v.progress_display(), "100.00");
    }

    #[test]
    fn test_progress_no_drift_across_many_transfers() {
        // 100 transfers of 1 unit each vs one transfer of 100 units
        let mut a = Vault::with_goal(1_000);
        for _ in 0..100 {
            a.credit(1).unwrap();
        }
        let mut b = Vault::with_goal(1_000);
        b.credit(100).unwrap();
        assert_eq!(a.progress_bps(), b.progress_bps());
    }
}
