//! Withdrawal requests and their approval lifecycle

mod status;

pub use status::WithdrawalStatus;

use serde::{Deserialize, Serialize};

use crate::core_types::{Amount, OperationId, UserId, WithdrawalId};

/// One withdrawal request.
///
/// Immutable after creation except for `status`, `retry_count` and
/// `updated_at`. The linked Operation is the audit record; `operation_id`
/// ties the two together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: WithdrawalId,
    pub user_id: UserId,
    pub asset: String,
    /// Amount debited from the user (fee included).
    pub amount: Amount,
    /// Fee retained by the platform; destination receives `amount - fee`.
    pub fee: Amount,
    pub destination: String,
    pub status: WithdrawalStatus,
    pub operation_id: OperationId,
    /// FAILED -> PROCESSING retries so far; bounded by config.
    pub retry_count: u32,
    /// Millis since epoch.
    pub created_at: i64,
    pub updated_at: i64,
}

impl Withdrawal {
    pub fn new(
        user_id: UserId,
        asset: String,
        amount: Amount,
        fee: Amount,
        destination: String,
        initial_status: WithdrawalStatus,
        operation_id: OperationId,
    ) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: WithdrawalId::new(),
            user_id,
            asset,
            amount,
            fee,
            destination,
            status: initial_status,
            operation_id,
            retry_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_withdrawal() {
        let op = OperationId::new();
        let w = Withdrawal::new(
            1001,
            "USDT".into(),
            1_000_000,
            100_000,
            "TB1qdest".into(),
            WithdrawalStatus::Pending,
            op,
        );
        assert_eq!(w.status, WithdrawalStatus::Pending);
        assert_eq!(w.operation_id, op);
        assert_eq!(w.retry_count, 0);
        assert_eq!(w.created_at, w.updated_at);
    }
}
