//! UserAccount - one user's wallet, vaults, and positions
//!
//! The aggregate every financial mutation operates on. All mutations for a
//! user run while holding the user's account lock (see `store`), so the
//! methods here can read-then-write without interference.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::balance::Balance;
use crate::core_types::{Amount, StrategyId, UserId};
use crate::error::LedgerError;
use crate::position::Position;
use crate::vault::{Vault, VaultKind, VaultLocation};

/// The three vaults every account carries.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Vaults {
    pub principal: Vault,
    pub profit: Vault,
    pub taxes: Vault,
}

impl Vaults {
    pub fn get(&self, kind: VaultKind) -> &Vault {
        match kind {
            VaultKind::Principal => &self.principal,
            VaultKind::Profit => &self.profit,
            VaultKind::Taxes => &self.taxes,
        }
    }

    pub fn get_mut(&mut self, kind: VaultKind) -> &mut Vault {
        match kind {
            VaultKind::Principal => &mut self.principal,
            VaultKind::Profit => &mut self.profit,
            VaultKind::Taxes => &mut self.taxes,
        }
    }
}

/// One user's account state for a single asset universe.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserAccount {
    user_id: UserId,
    pub wallet: Balance,
    pub vaults: Vaults,
    pub positions: FxHashMap<StrategyId, Position>,
}

impl UserAccount {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    #[inline(always)]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Sum of wallet.available and all vault balances.
    ///
    /// This is the quantity the vault transfer invariant conserves.
    pub fn liquid_total(&self) -> Amount {
        self.wallet.available()
            + self.vaults.principal.balance()
            + self.vaults.profit.balance()
            + self.vaults.taxes.balance()
    }

    /// Move `amount` between two distinct locations atomically.
    ///
    /// Validation happens before any mutation; the debit is applied first
    /// and cannot leave a half-applied state because both legs operate on
    /// this exclusively-borrowed account.
    pub fn transfer(
        &mut self,
        from: VaultLocation,
        to: VaultLocation,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::SameLocation);
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("amount must be positive".into()));
        }

        // Source must cover the amount before anything moves
        let source_balance = match from.vault_kind() {
            None => self.wallet.available(),
            Some(kind) => self.vaults.get(kind).balance(),
        };
        if source_balance < amount {
            return Err(LedgerError::InsufficientBalance);
        }

        match from.vault_kind() {
            None => self.wallet.debit(amount)?,
            Some(kind) => self.vaults.get_mut(kind).debit(amount)?,
        }
        match to.vault_kind() {
            None => self.wallet.deposit(amount)?,
            Some(kind) => self.vaults.get_mut(kind).credit(amount)?,
        }
        Ok(())
    }

    /// Record capital entering a strategy: debit the wallet and grow (or
    /// open) the position by exactly `amount`.
    pub fn invest(&mut self, strategy_id: StrategyId, amount: Amount) -> Result<Position, LedgerError> {
        self.wallet.debit(amount)?;
        // Compute the grown position before touching the map, so a failed
        // first investment never leaves an empty position behind.
        let mut position = self
            .positions
            .get(&strategy_id)
            .copied()
            .unwrap_or_else(|| Position::open(0));
        if let Err(e) = position.apply_investment(amount) {
            // Roll the debit back so no partial application is observable
            self.wallet.deposit(amount)?;
            return Err(e);
        }
        self.positions.insert(strategy_id, position);
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_account() -> UserAccount {
        let mut acc = UserAccount::new(42);
        acc.wallet.deposit(10_000_000).unwrap();
        acc
    }

    #[test]
    fn test_transfer_wallet_to_vault() {
        let mut acc = funded_account();
        acc.vaults.principal = Vault::with_goal(10_000_000);
        acc.vaults.principal.credit(2_000_000).unwrap();

        let before = acc.liquid_total();
        acc.transfer(VaultLocation::Wallet, VaultLocation::Principal, 1_000_000)
            .unwrap();

        assert_eq!(acc.wallet.available(), 9_000_000);
        assert_eq!(acc.vaults.principal.balance(), 3_000_000);
        assert_eq!(acc.vaults.principal.progress_display(), "30.00");
        assert_eq!(acc.liquid_total(), before);
    }

    #[test]
    fn test_transfer_vault_to_vault() {
        let mut acc = funded_account();
        acc.vaults.profit.credit(500).unwrap();

        acc.transfer(VaultLocation::Profit, VaultLocation::Taxes, 200)
            .unwrap();
        assert_eq!(acc.vaults.profit.balance(), 300);
        assert_eq!(acc.vaults.taxes.balance(), 200);
    }

    #[test]
    fn test_transfer_same_location_rejected() {
        let mut acc = funded_account();
        assert_eq!(
            acc.transfer(VaultLocation::Wallet, VaultLocation::Wallet, 100),
            Err(LedgerError::SameLocation)
        );
    }

    #[test]
    fn test_transfer_insufficient_mutates_nothing() {
        let mut acc = funded_account();
        let before = acc.clone();
        assert_eq!(
            acc.transfer(VaultLocation::Taxes, VaultLocation::Wallet, 1),
            Err(LedgerError::InsufficientBalance)
        );
        assert_eq!(acc.wallet, before.wallet);
        assert_eq!(acc.vaults.taxes.balance(), 0);
    }

    #[test]
    fn test_invest_opens_then_grows_position() {
        let mut acc = funded_account();
        let p1 = acc.invest(7, 1_000_000).unwrap();
        assert_eq!(p1.principal_minor(), 1_000_000);
        assert_eq!(p1.current_value_minor(), 1_000_000);

        let p2 = acc.invest(7, 500_000).unwrap();
        assert_eq!(p2.principal_minor(), 1_500_000);
        assert_eq!(p2.current_value_minor(), 1_500_000);
        assert_eq!(acc.wallet.available(), 8_500_000);
    }

    #[test]
    fn test_invest_overflow_rolls_back_cleanly() {
        let mut acc = UserAccount::new(1);
        acc.wallet.deposit(u128::MAX).unwrap();
        acc.invest(3, u128::MAX - 5).unwrap();
        acc.wallet.deposit(100).unwrap();

        let before = *acc.positions.get(&3).unwrap();
        assert_eq!(acc.invest(3, 100), Err(LedgerError::Overflow));
        // Wallet restored, position unchanged, no extra entries
        assert_eq!(acc.wallet.available(), 105);
        assert_eq!(*acc.positions.get(&3).unwrap(), before);
        assert_eq!(acc.positions.len(), 1);
    }

    #[test]
    fn test_invest_insufficient() {
        let mut acc = UserAccount::new(1);
        assert_eq!(
            acc.invest(1, 100),
            Err(LedgerError::InsufficientBalance)
        );
        assert!(acc.positions.is_empty());
    }
}
