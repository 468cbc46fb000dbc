//! Ledger Engine - orchestrates every financial mutation
//!
//! Each public method is one request-scoped atomic step: validate, take the
//! user's account lock, replay if the idempotency key is known, mutate,
//! write exactly one Operation, record the key. All business-rule checks
//! run before any mutation, so a failure never leaves partial state behind.

use std::sync::Arc;

use tracing::{info, warn};

use crate::account::UserAccount;
use crate::asset::{AssetRegistry, StrategyRegistry};
use crate::core_types::{Amount, StrategyId, UserId, WithdrawalId};
use crate::error::LedgerError;
use crate::gate::InvestmentGate;
use crate::idempotency::IdempotencyKey;
use crate::money;
use crate::operation::{Operation, OperationStatus, OperationType};
use crate::payout::{self, PayoutInput};
use crate::store::LedgerStore;
use crate::vault::VaultLocation;
use crate::withdrawal::{Withdrawal, WithdrawalStatus};

/// Result of one mutation: the committed Operation, and whether it was an
/// idempotent replay of an earlier request rather than a fresh execution.
#[derive(Debug, Clone)]
pub struct OperationOutcome {
    pub operation: Operation,
    pub replayed: bool,
}

pub struct LedgerEngine {
    store: Arc<LedgerStore>,
    assets: Arc<AssetRegistry>,
    strategies: Arc<StrategyRegistry>,
    gate: Arc<dyn InvestmentGate>,
    /// The asset wallets and vaults are denominated in.
    base_asset: String,
    /// Cap on FAILED -> PROCESSING retries per withdrawal.
    max_withdrawal_retries: u32,
}

impl LedgerEngine {
    pub fn new(
        store: Arc<LedgerStore>,
        assets: Arc<AssetRegistry>,
        strategies: Arc<StrategyRegistry>,
        gate: Arc<dyn InvestmentGate>,
        base_asset: String,
        max_withdrawal_retries: u32,
    ) -> Self {
        Self {
            store,
            assets,
            strategies,
            gate,
            base_asset,
            max_withdrawal_retries,
        }
    }

    pub fn assets(&self) -> &AssetRegistry {
        &self.assets
    }

    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    pub fn base_asset(&self) -> &str {
        &self.base_asset
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Replay lookup. Must be called with the user's account lock held.
    fn replay(
        &self,
        user_id: UserId,
        key: Option<&IdempotencyKey>,
    ) -> Result<Option<Operation>, LedgerError> {
        let Some(key) = key else { return Ok(None) };
        let Some(op_id) = self.store.idempotency.lookup(user_id, key) else {
            return Ok(None);
        };
        let op = self
            .store
            .operations
            .get(op_id)
            .ok_or_else(|| LedgerError::Storage(format!("dangling idempotency record {}", op_id)))?;
        info!(user_id, key = %key, operation_id = %op_id, "idempotent replay, effect not re-applied");
        Ok(Some(op))
    }

    /// Commit one operation: append to the log and bind the key to it.
    fn commit(
        &self,
        user_id: UserId,
        key: Option<IdempotencyKey>,
        op: Operation,
    ) -> OperationOutcome {
        let op = self.store.operations.append(op);
        if let Some(key) = key {
            self.store.idempotency.record(user_id, key, op.id);
        }
        OperationOutcome {
            operation: op,
            replayed: false,
        }
    }

    // ========================================================================
    // Deposit
    // ========================================================================

    /// Credit the wallet's available balance (simulated fiat/chain inflow).
    pub fn deposit(
        &self,
        user_id: UserId,
        amount: Amount,
        key: Option<IdempotencyKey>,
    ) -> Result<OperationOutcome, LedgerError> {
        self.assets.get(&self.base_asset)?;
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("amount must be positive".into()));
        }

        let account = self.store.account(user_id);
        let mut acc = LedgerStore::lock_account(&account);
        if let Some(op) = self.replay(user_id, key.as_ref())? {
            return Ok(OperationOutcome {
                operation: op,
                replayed: true,
            });
        }

        acc.wallet.deposit(amount)?;
        info!(user_id, amount, "deposit credited");

        let op = Operation::new(
            user_id,
            OperationType::Deposit,
            OperationStatus::Completed,
            amount,
            &self.base_asset,
            None,
        );
        Ok(self.commit(user_id, key, op))
    }

    // ========================================================================
    // Vault transfer
    // ========================================================================

    /// Move funds between two distinct locations among wallet and vaults.
    ///
    /// Conserves wallet.available + all vault balances exactly.
    pub fn vault_transfer(
        &self,
        user_id: UserId,
        from: VaultLocation,
        to: VaultLocation,
        amount: Amount,
        key: Option<IdempotencyKey>,
    ) -> Result<OperationOutcome, LedgerError> {
        let asset = self.assets.get(&self.base_asset)?;
        if from == to {
            return Err(LedgerError::SameLocation);
        }
        if amount < asset.min_transfer {
            return Err(LedgerError::BelowMinimum);
        }

        let account = self.store.account(user_id);
        let mut acc = LedgerStore::lock_account(&account);
        if let Some(op) = self.replay(user_id, key.as_ref())? {
            return Ok(OperationOutcome {
                operation: op,
                replayed: true,
            });
        }

        acc.transfer(from, to, amount)?;
        info!(user_id, %from, %to, amount, "vault transfer committed");

        let op = Operation::new(
            user_id,
            OperationType::VaultTransfer,
            OperationStatus::Completed,
            amount,
            &self.base_asset,
            Some(format!("{}->{}", from, to)),
        );
        Ok(self.commit(user_id, key, op))
    }

    // ========================================================================
    // Invest
    // ========================================================================

    /// Record capital entering a strategy: gate, minimum, wallet debit,
    /// position upsert.
    pub fn invest(
        &self,
        user_id: UserId,
        strategy_id: StrategyId,
        amount: Amount,
        key: Option<IdempotencyKey>,
    ) -> Result<OperationOutcome, LedgerError> {
        let strategy = self.strategies.get(strategy_id)?;
        self.gate.check_invest(user_id)?;
        if amount < strategy.min_investment {
            return Err(LedgerError::BelowMinimum);
        }

        let account = self.store.account(user_id);
        let mut acc = LedgerStore::lock_account(&account);
        if let Some(op) = self.replay(user_id, key.as_ref())? {
            return Ok(OperationOutcome {
                operation: op,
                replayed: true,
            });
        }

        let position = acc.invest(strategy_id, amount)?;
        info!(
            user_id,
            strategy_id,
            amount,
            principal = %position.principal_minor(),
            "investment applied"
        );

        let op = Operation::new(
            user_id,
            OperationType::Investment,
            OperationStatus::Completed,
            amount,
            &strategy.asset,
            Some(strategy_id.to_string()),
        );
        Ok(self.commit(user_id, key, op))
    }

    // ========================================================================
    // Daily payout (Model A)
    // ========================================================================

    /// Credit accrued profit to the wallet; principal and current value of
    /// the position stay untouched. Triggered externally on a schedule.
    pub fn apply_daily_payout(
        &self,
        user_id: UserId,
        strategy_id: StrategyId,
        payout_amount: Amount,
    ) -> Result<OperationOutcome, LedgerError> {
        self.strategies.get(strategy_id)?;

        let account = self.store.account(user_id);
        let mut acc = LedgerStore::lock_account(&account);
        let position = *acc.positions.get(&strategy_id).ok_or_else(|| {
            LedgerError::InvalidParameter(format!(
                "user {} has no position in strategy {}",
                user_id, strategy_id
            ))
        })?;

        let outcome = payout::apply_daily_payout(PayoutInput {
            position_current_value: position.current_value_minor(),
            balance_available: acc.wallet.available(),
            payout_amount,
        })?;
        acc.wallet.deposit(payout_amount)?;
        debug_assert_eq!(acc.wallet.available(), outcome.balance_available);
        info!(user_id, strategy_id, payout_amount, "daily payout credited");

        let op = Operation::new(
            user_id,
            OperationType::ProfitPayout,
            OperationStatus::Completed,
            payout_amount,
            &self.base_asset,
            Some(strategy_id.to_string()),
        );
        Ok(self.commit(user_id, None, op))
    }

    // ========================================================================
    // Withdrawals
    // ========================================================================

    /// Create a withdrawal request and reserve the funds.
    ///
    /// Authorization uses the SIGNED net-receive; a fee that swallows the
    /// amount rejects the request instead of zeroing it out.
    pub fn submit_withdrawal(
        &self,
        user_id: UserId,
        asset_symbol: &str,
        amount: Amount,
        destination: &str,
        key: Option<IdempotencyKey>,
    ) -> Result<(Withdrawal, OperationOutcome), LedgerError> {
        let asset = self.assets.get(asset_symbol)?;
        if destination.trim().is_empty() {
            return Err(LedgerError::InvalidParameter(
                "destination must not be empty".into(),
            ));
        }
        if amount == 0 {
            return Err(LedgerError::InvalidAmount("amount must be positive".into()));
        }
        if money::net_receive(amount, asset.withdraw_fee) <= 0 {
            return Err(LedgerError::InvalidAmount(
                "fee meets or exceeds withdrawal amount".into(),
            ));
        }

        let account = self.store.account(user_id);
        let mut acc = LedgerStore::lock_account(&account);
        if let Some(op) = self.replay(user_id, key.as_ref())? {
            let withdrawal = self.withdrawal_for_operation(&op)?;
            return Ok((
                withdrawal,
                OperationOutcome {
                    operation: op,
                    replayed: true,
                },
            ));
        }

        acc.wallet.lock(amount)?;

        let initial_status = if amount >= asset.review_threshold {
            WithdrawalStatus::PendingReview
        } else {
            WithdrawalStatus::Pending
        };
        let mut op = Operation::new(
            user_id,
            OperationType::Withdrawal,
            OperationStatus::Pending,
            amount,
            &asset.symbol,
            None,
        );
        let withdrawal = Withdrawal::new(
            user_id,
            asset.symbol.clone(),
            amount,
            asset.withdraw_fee,
            destination.trim().to_string(),
            initial_status,
            op.id,
        );
        op.related_entity_id = Some(withdrawal.id.to_string());
        info!(
            user_id,
            withdrawal_id = %withdrawal.id,
            amount,
            status = %initial_status,
            "withdrawal submitted, funds locked"
        );

        self.store.insert_withdrawal(withdrawal.clone());
        let outcome = self.commit(user_id, key, op);
        Ok((withdrawal, outcome))
    }

    fn withdrawal_for_operation(&self, op: &Operation) -> Result<Withdrawal, LedgerError> {
        // A key first consumed by some other operation type is a client
        // mistake, not a storage fault.
        if op.op_type != OperationType::Withdrawal {
            return Err(LedgerError::InvalidParameter(format!(
                "idempotency key was already used for a {} operation",
                op.op_type
            )));
        }
        let related = op
            .related_entity_id
            .as_deref()
            .ok_or_else(|| LedgerError::Storage("withdrawal operation without link".into()))?;
        let id: WithdrawalId = related
            .parse()
            .map_err(|_| LedgerError::Storage(format!("bad withdrawal link: {}", related)))?;
        self.store.get_withdrawal(id)
    }

    /// Advance a withdrawal through the approval workflow.
    ///
    /// Out-of-table transitions fail with `InvalidTransition` and mutate
    /// nothing. Fund effects per the lifecycle:
    /// - `APPROVED -> PROCESSING` spends the locked amount
    /// - `FAILED -> PROCESSING` retries with no balance effect, bounded
    /// - rejection/cancellation before processing releases the lock
    pub fn transition_withdrawal(
        &self,
        id: WithdrawalId,
        to: WithdrawalStatus,
    ) -> Result<Withdrawal, LedgerError> {
        // Resolve the owner first, then re-read under their account lock.
        let owner = self.store.get_withdrawal(id)?.user_id;
        let account = self.store.account(owner);
        let mut acc = LedgerStore::lock_account(&account);
        let mut w = self.store.get_withdrawal(id)?;

        let from = w.status;
        if !from.can_transition_to(to) {
            warn!(withdrawal_id = %id, %from, %to, "rejected out-of-table transition");
            return Err(LedgerError::InvalidTransition { from, to });
        }

        match (from, to) {
            (WithdrawalStatus::Approved, WithdrawalStatus::Processing) => {
                acc.wallet.spend_locked(w.amount)?;
            }
            (WithdrawalStatus::Failed, WithdrawalStatus::Processing) => {
                // Funds stay reserved from the original attempt
                if w.retry_count >= self.max_withdrawal_retries {
                    warn!(withdrawal_id = %id, retries = w.retry_count, "retry limit exceeded");
                    return Err(LedgerError::RetryLimitExceeded);
                }
                w.retry_count += 1;
            }
            (from, WithdrawalStatus::Rejected | WithdrawalStatus::Cancelled)
                if from.is_pre_processing() =>
            {
                acc.wallet.unlock(w.amount)?;
            }
            _ => {}
        }

        w.status = to;
        w.updated_at = chrono::Utc::now().timestamp_millis();
        self.store.update_withdrawal(w.clone());

        match to {
            WithdrawalStatus::Completed => {
                self.store
                    .operations
                    .set_status(w.operation_id, OperationStatus::Completed);
            }
            WithdrawalStatus::Rejected => {
                self.store
                    .operations
                    .set_status(w.operation_id, OperationStatus::Failed);
            }
            WithdrawalStatus::Cancelled => {
                self.store
                    .operations
                    .set_status(w.operation_id, OperationStatus::Cancelled);
            }
            _ => {}
        }

        info!(withdrawal_id = %id, %from, %to, "withdrawal transitioned");
        Ok(w)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Point-in-time copy of a user's account.
    pub fn account_snapshot(&self, user_id: UserId) -> UserAccount {
        let account = self.store.account(user_id);
        let acc = LedgerStore::lock_account(&account);
        acc.clone()
    }
}
