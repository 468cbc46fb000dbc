//! Operation Log - the audit record of every financial action
//!
//! One Operation is created per financial action and referenced by
//! idempotency records and withdrawals. Entries are append-style: only the
//! `status` field changes after creation, and only for withdrawals reaching
//! a terminal state.

use std::fmt;
use std::sync::Mutex;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, OperationId, UserId};

/// The closed set of financial action types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationType {
    Deposit,
    Investment,
    VaultTransfer,
    Withdrawal,
    ProfitPayout,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Deposit => "DEPOSIT",
            OperationType::Investment => "INVESTMENT",
            OperationType::VaultTransfer => "VAULT_TRANSFER",
            OperationType::Withdrawal => "WITHDRAWAL",
            OperationType::ProfitPayout => "PROFIT_PAYOUT",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    /// Committed but not yet settled (withdrawals awaiting the FSM).
    Pending,
    Completed,
    Failed,
    Cancelled,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Pending => "PENDING",
            OperationStatus::Completed => "COMPLETED",
            OperationStatus::Failed => "FAILED",
            OperationStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The canonical ledger record of one financial action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub id: OperationId,
    pub user_id: UserId,
    pub op_type: OperationType,
    pub status: OperationStatus,
    pub amount: Amount,
    pub asset: String,
    /// Withdrawal id, strategy id, or transfer route this operation settles.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_entity_id: Option<String>,
    /// Millis since epoch.
    pub created_at: i64,
}

impl Operation {
    pub fn new(
        user_id: UserId,
        op_type: OperationType,
        status: OperationStatus,
        amount: Amount,
        asset: impl Into<String>,
        related_entity_id: Option<String>,
    ) -> Self {
        Self {
            id: OperationId::new(),
            user_id,
            op_type,
            status,
            amount,
            asset: asset.into(),
            related_entity_id,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Append-style in-memory operation log.
///
/// `entries` gives O(1) lookup by id; `order` preserves append order for
/// audit listings.
#[derive(Debug, Default)]
pub struct OperationLog {
    entries: DashMap<OperationId, Operation>,
    order: Mutex<Vec<OperationId>>,
}

impl OperationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one operation. Ids are ULIDs, so collisions do not happen;
    /// a duplicate append is a logic bug upstream.
    pub fn append(&self, op: Operation) -> Operation {
        self.order
            .lock()
            .expect("operation log order lock poisoned")
            .push(op.id);
        self.entries.insert(op.id, op.clone());
        op
    }

    pub fn get(&self, id: OperationId) -> Option<Operation> {
        self.entries.get(&id).map(|e| e.clone())
    }

    /// Update the status of an existing entry (withdrawal settlement only).
    pub fn set_status(&self, id: OperationId, status: OperationStatus) {
        if let Some(mut e) = self.entries.get_mut(&id) {
            e.status = status;
        }
    }

    /// All operations for a user, in append order.
    pub fn list_for_user(&self, user_id: UserId) -> Vec<Operation> {
        let order = self
            .order
            .lock()
            .expect("operation log order lock poisoned");
        order
            .iter()
            .filter_map(|id| self.entries.get(id))
            .filter(|op| op.user_id == user_id)
            .map(|op| op.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(user: UserId, amount: Amount) -> Operation {
        Operation::new(
            user,
            OperationType::Deposit,
            OperationStatus::Completed,
            amount,
            "USDT",
            None,
        )
    }

    #[test]
    fn test_append_and_get() {
        let log = OperationLog::new();
        let o = log.append(op(1, 100));
        assert_eq!(log.len(), 1);

        let fetched = log.get(o.id).unwrap();
        assert_eq!(fetched.amount, 100);
        assert_eq!(fetched.op_type, OperationType::Deposit);
    }

    #[test]
    fn test_list_for_user_preserves_order() {
        let log = OperationLog::new();
        let a = log.append(op(1, 1));
        log.append(op(2, 2));
        let c = log.append(op(1, 3));

        let user1 = log.list_for_user(1);
        assert_eq!(user1.len(), 2);
        assert_eq!(user1[0].id, a.id);
        assert_eq!(user1[1].id, c.id);
    }

    #[test]
    fn test_set_status() {
        let log = OperationLog::new();
        let o = log.append(Operation::new(
            1,
            OperationType::Withdrawal,
            OperationStatus::Pending,
            500,
            "USDT",
            None,
        ));
        log.set_status(o.id, OperationStatus::Completed);
        assert_eq!(log.get(o.id).unwrap().status, OperationStatus::Completed);
    }
}
