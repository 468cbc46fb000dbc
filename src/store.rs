//! In-memory ledger store
//!
//! Holds the shared mutable state: user accounts, withdrawal records, the
//! operation log, and idempotency records. Per-user serialization is the
//! contract: every balance mutation runs while holding that user's account
//! mutex, so read-then-write is never split by an intervening writer. No
//! ordering is provided (or needed) across different users.
//!
//! A persistent implementation must preserve the same contracts: row-scoped
//! transactions, a unique constraint on (user_id, idempotency key), and an
//! append-only operation log.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::account::UserAccount;
use crate::core_types::{UserId, WithdrawalId};
use crate::error::LedgerError;
use crate::idempotency::IdempotencyGuard;
use crate::operation::OperationLog;
use crate::withdrawal::Withdrawal;

#[derive(Default)]
pub struct LedgerStore {
    accounts: DashMap<UserId, Arc<Mutex<UserAccount>>>,
    withdrawals: DashMap<WithdrawalId, Withdrawal>,
    pub operations: OperationLog,
    pub idempotency: IdempotencyGuard,
}

impl LedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lock handle for a user's account, provisioning it on first touch.
    ///
    /// Accounts live for the lifetime of the process; they are never removed,
    /// so the Arc can be held across the DashMap access.
    pub fn account(&self, user_id: UserId) -> Arc<Mutex<UserAccount>> {
        self.accounts
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(UserAccount::new(user_id))))
            .clone()
    }

    /// Lock a user's account for one atomic mutation.
    ///
    /// Critical sections must not await; they are short read-compute-write
    /// spans, which is why a std mutex is sufficient here.
    pub fn lock_account(account: &Arc<Mutex<UserAccount>>) -> MutexGuard<'_, UserAccount> {
        account.lock().expect("user account lock poisoned")
    }

    pub fn insert_withdrawal(&self, w: Withdrawal) {
        self.withdrawals.insert(w.id, w);
    }

    pub fn get_withdrawal(&self, id: WithdrawalId) -> Result<Withdrawal, LedgerError> {
        self.withdrawals
            .get(&id)
            .map(|e| e.clone())
            .ok_or_else(|| LedgerError::WithdrawalNotFound(id.to_string()))
    }

    /// Replace a withdrawal record. Caller must hold the owner's account lock.
    pub fn update_withdrawal(&self, w: Withdrawal) {
        self.withdrawals.insert(w.id, w);
    }

    pub fn list_withdrawals(&self, user_id: UserId) -> Vec<Withdrawal> {
        let mut rows: Vec<Withdrawal> = self
            .withdrawals
            .iter()
            .filter(|e| e.user_id == user_id)
            .map(|e| e.clone())
            .collect();
        rows.sort_by_key(|w| w.created_at);
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_provisioned_once() {
        let store = LedgerStore::new();
        let a = store.account(1);
        {
            let mut acc = LedgerStore::lock_account(&a);
            acc.wallet.deposit(500).unwrap();
        }
        // Second handle sees the same account
        let b = store.account(1);
        let acc = LedgerStore::lock_account(&b);
        assert_eq!(acc.wallet.available(), 500);
    }

    #[test]
    fn test_withdrawal_roundtrip() {
        use crate::core_types::OperationId;
        use crate::withdrawal::WithdrawalStatus;

        let store = LedgerStore::new();
        let w = Withdrawal::new(
            1,
            "USDT".into(),
            100,
            0,
            "dest".into(),
            WithdrawalStatus::Pending,
            OperationId::new(),
        );
        let id = w.id;
        store.insert_withdrawal(w);

        let fetched = store.get_withdrawal(id).unwrap();
        assert_eq!(fetched.amount, 100);
        assert!(store.get_withdrawal(WithdrawalId::new()).is_err());
    }

    #[test]
    fn test_concurrent_mutations_serialize() {
        let store = Arc::new(LedgerStore::new());
        let handle = store.account(9);
        {
            let mut acc = LedgerStore::lock_account(&handle);
            acc.wallet.deposit(0).unwrap();
        }

        let mut threads = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            threads.push(std::thread::spawn(move || {
                for _ in 0..1_000 {
                    let handle = store.account(9);
                    let mut acc = LedgerStore::lock_account(&handle);
                    acc.wallet.deposit(1).unwrap();
                }
            }));
        }
        for t in threads {
            t.join().unwrap();
        }

        let handle = store.account(9);
        let acc = LedgerStore::lock_account(&handle);
        assert_eq!(acc.wallet.available(), 8_000);
    }
}
