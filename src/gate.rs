//! Investment gates - collaborator-owned preconditions
//!
//! Business preconditions such as "KYC approved" live outside this core but
//! are checked before capital moves. The trait is the seam the surrounding
//! application plugs its decisioning into.

use crate::core_types::UserId;
use crate::error::LedgerError;

/// Precondition check consulted before invest operations.
pub trait InvestmentGate: Send + Sync {
    /// Ok(()) to allow; Err(GateBlocked) with the blocking reason otherwise.
    fn check_invest(&self, user_id: UserId) -> Result<(), LedgerError>;
}

/// Gate that allows everyone. The default when the shell wires no gate.
#[derive(Debug, Default, Clone, Copy)]
pub struct AllowAll;

impl InvestmentGate for AllowAll {
    fn check_invest(&self, _user_id: UserId) -> Result<(), LedgerError> {
        Ok(())
    }
}

/// Gate driven by a static deny-set, for tests and local runs.
#[derive(Debug, Default)]
pub struct DenyList {
    blocked: Vec<UserId>,
    reason: String,
}

impl DenyList {
    pub fn new(blocked: Vec<UserId>, reason: impl Into<String>) -> Self {
        Self {
            blocked,
            reason: reason.into(),
        }
    }
}

impl InvestmentGate for DenyList {
    fn check_invest(&self, user_id: UserId) -> Result<(), LedgerError> {
        if self.blocked.contains(&user_id) {
            return Err(LedgerError::GateBlocked(self.reason.clone()));
        }
        Ok(())
    }
}
