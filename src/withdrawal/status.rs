//! Withdrawal FSM status definitions
//!
//! The allowed-transition table is encoded as exhaustive `match` arms so
//! that adding a status forces every switch site to be revisited at
//! compile time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Withdrawal lifecycle states.
///
/// `PendingReview` and `Pending` are equivalent "awaiting triage" entry
/// states; which one a request starts in depends on the submission path.
/// Terminal states: `Completed`, `Rejected`, `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WithdrawalStatus {
    PendingReview,
    Pending,
    PendingApproval,
    Approved,
    Processing,
    Completed,
    Failed,
    Rejected,
    Cancelled,
}

impl WithdrawalStatus {
    /// All states, for table-driven tests and operator tooling.
    pub const ALL: [WithdrawalStatus; 9] = [
        WithdrawalStatus::PendingReview,
        WithdrawalStatus::Pending,
        WithdrawalStatus::PendingApproval,
        WithdrawalStatus::Approved,
        WithdrawalStatus::Processing,
        WithdrawalStatus::Completed,
        WithdrawalStatus::Failed,
        WithdrawalStatus::Rejected,
        WithdrawalStatus::Cancelled,
    ];

    /// The transition table row for this state.
    pub fn allowed_transitions(&self) -> &'static [WithdrawalStatus] {
        use WithdrawalStatus::*;
        match self {
            PendingReview => &[PendingApproval, Rejected, Cancelled],
            Pending => &[PendingApproval, Rejected, Cancelled],
            PendingApproval => &[Approved, Rejected, Cancelled],
            Approved => &[Processing, Cancelled],
            Processing => &[Completed, Failed],
            Failed => &[Processing], // retry
            Completed | Rejected | Cancelled => &[],
        }
    }

    /// Table lookup: is `self -> to` a legal transition?
    #[inline]
    pub fn can_transition_to(&self, to: WithdrawalStatus) -> bool {
        self.allowed_transitions().contains(&to)
    }

    /// No more transitions possible.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WithdrawalStatus::Completed | WithdrawalStatus::Rejected | WithdrawalStatus::Cancelled
        )
    }

    /// Funds are still only reserved (locked, not yet spent).
    ///
    /// Rejection or cancellation from one of these states releases the lock.
    #[inline]
    pub fn is_pre_processing(&self) -> bool {
        matches!(
            self,
            WithdrawalStatus::PendingReview
                | WithdrawalStatus::Pending
                | WithdrawalStatus::PendingApproval
                | WithdrawalStatus::Approved
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawalStatus::PendingReview => "PENDING_REVIEW",
            WithdrawalStatus::Pending => "PENDING",
            WithdrawalStatus::PendingApproval => "PENDING_APPROVAL",
            WithdrawalStatus::Approved => "APPROVED",
            WithdrawalStatus::Processing => "PROCESSING",
            WithdrawalStatus::Completed => "COMPLETED",
            WithdrawalStatus::Failed => "FAILED",
            WithdrawalStatus::Rejected => "REJECTED",
            WithdrawalStatus::Cancelled => "CANCELLED",
        }
    }
}

impl fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING_REVIEW" => Ok(WithdrawalStatus::PendingReview),
            "PENDING" => Ok(WithdrawalStatus::Pending),
            "PENDING_APPROVAL" => Ok(WithdrawalStatus::PendingApproval),
            "APPROVED" => Ok(WithdrawalStatus::Approved),
            "PROCESSING" => Ok(WithdrawalStatus::Processing),
            "COMPLETED" => Ok(WithdrawalStatus::Completed),
            "FAILED" => Ok(WithdrawalStatus::Failed),
            "REJECTED" => Ok(WithdrawalStatus::Rejected),
            "CANCELLED" => Ok(WithdrawalStatus::Cancelled),
            other => Err(format!("unknown withdrawal status: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use WithdrawalStatus::*;

    #[test]
    fn test_terminal_states() {
        assert!(Completed.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(Cancelled.is_terminal());

        assert!(!PendingReview.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!PendingApproval.is_terminal());
        assert!(!Approved.is_terminal());
        assert!(!Processing.is_terminal());
        assert!(!Failed.is_terminal());
    }

    #[test]
    fn test_terminal_states_have_no_transitions() {
        for s in WithdrawalStatus::ALL {
            assert_eq!(s.is_terminal(), s.allowed_transitions().is_empty());
        }
    }

    #[test]
    fn test_transition_table() {
        assert!(PendingReview.can_transition_to(PendingApproval));
        assert!(Pending.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Completed));
        assert!(Processing.can_transition_to(Failed));
        assert!(Failed.can_transition_to(Processing)); // retry
        assert!(Approved.can_transition_to(Cancelled));
    }

    #[test]
    fn test_illegal_transitions() {
        // COMPLETED is final
        assert!(!Completed.can_transition_to(Processing));

        assert!(!Pending.can_transition_to(Approved)); // must pass approval
        assert!(!Pending.can_transition_to(Processing));
        assert!(!Processing.can_transition_to(Cancelled)); // no cancel once processing
        assert!(!Failed.can_transition_to(Cancelled));
        assert!(!Rejected.can_transition_to(Pending));
        for s in WithdrawalStatus::ALL {
            assert!(!s.can_transition_to(s), "{} -> {} must be illegal", s, s);
        }
    }

    #[test]
    fn test_pre_processing_states() {
        assert!(PendingReview.is_pre_processing());
        assert!(Pending.is_pre_processing());
        assert!(PendingApproval.is_pre_processing());
        assert!(Approved.is_pre_processing());

        assert!(!Processing.is_pre_processing());
        assert!(!Failed.is_pre_processing());
        assert!(!Completed.is_pre_processing());
    }

    #[test]
    fn test_display_parse_roundtrip() {
        for s in WithdrawalStatus::ALL {
            let parsed: WithdrawalStatus = s.as_str().parse().unwrap();
            assert_eq!(s, parsed);
        }
        assert!("SHIPPED".parse::<WithdrawalStatus>().is_err());
    }
}
