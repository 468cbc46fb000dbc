//! Idempotency Guard
//!
//! Deduplicates client-submitted mutating requests keyed by a caller-supplied
//! token. First use of a (user, key) pair executes and records the resulting
//! Operation; every later use replays that Operation instead of re-executing.
//!
//! The insert-if-absent on the record map is the in-memory analogue of a
//! unique constraint on (user_id, key) enforced at commit time. The engine
//! performs lookup -> execute -> record inside the per-user account lock,
//! which closes the race window between concurrent identical requests: the
//! loser re-reads the winner's record when it acquires the lock.

use std::fmt;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core_types::{OperationId, UserId};

/// A client idempotency token.
///
/// Callers generate keys as `{prefix}_{uuid}_{timestamp}`; `generate`
/// produces that canonical form. Uniqueness of the token is the caller's
/// responsibility; uniqueness of EFFECT is the guard's. Any non-empty token
/// is honored, canonical or not.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Canonical `{prefix}_{uuid}_{timestamp}` key.
    pub fn generate(prefix: &str) -> Self {
        Self(format!(
            "{}_{}_{}",
            prefix,
            uuid::Uuid::new_v4(),
            chrono::Utc::now().timestamp_millis()
        ))
    }

    /// Whether the key follows the canonical format.
    pub fn is_canonical(&self) -> bool {
        let mut parts = self.0.splitn(2, '_');
        let _prefix = match parts.next() {
            Some(p) if !p.is_empty() => p,
            _ => return false,
        };
        let rest = match parts.next() {
            Some(r) => r,
            None => return false,
        };
        // rest = {uuid}_{timestamp}; uuid is 36 chars with hyphens
        match rest.split_at_checked(36) {
            Some((uuid_part, tail)) => {
                uuid::Uuid::parse_str(uuid_part).is_ok()
                    && tail.strip_prefix('_').is_some_and(|ts| {
                        !ts.is_empty() && ts.chars().all(|c| c.is_ascii_digit())
                    })
            }
            None => false,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Write-once record map keyed by (user, key).
#[derive(Debug, Default)]
pub struct IdempotencyGuard {
    records: DashMap<(UserId, IdempotencyKey), OperationId>,
}

impl IdempotencyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The Operation previously recorded for this (user, key), if any.
    pub fn lookup(&self, user_id: UserId, key: &IdempotencyKey) -> Option<OperationId> {
        self.records
            .get(&(user_id, key.clone()))
            .map(|e| *e.value())
    }

    /// Record the Operation for this (user, key). Insert-if-absent: the
    /// first writer wins, and the winning OperationId is returned either way.
    pub fn record(
        &self,
        user_id: UserId,
        key: IdempotencyKey,
        operation_id: OperationId,
    ) -> OperationId {
        *self
            .records
            .entry((user_id, key))
            .or_insert(operation_id)
            .value()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_key_is_canonical() {
        let key = IdempotencyKey::generate("dep");
        assert!(key.is_canonical(), "generated key not canonical: {}", key);
        assert!(key.as_str().starts_with("dep_"));
    }

    #[test]
    fn test_opaque_keys_accepted() {
        let key = IdempotencyKey::new("just-some-token").unwrap();
        assert!(!key.is_canonical());
        assert!(IdempotencyKey::new("   ").is_none());
        assert!(IdempotencyKey::new("").is_none());
    }

    #[test]
    fn test_first_record_wins() {
        let guard = IdempotencyGuard::new();
        let key = IdempotencyKey::generate("inv");
        let first = OperationId::new();
        let second = OperationId::new();

        assert_eq!(guard.lookup(1, &key), None);
        assert_eq!(guard.record(1, key.clone(), first), first);
        // A duplicate record returns the original, not the new id
        assert_eq!(guard.record(1, key.clone(), second), first);
        assert_eq!(guard.lookup(1, &key), Some(first));
        assert_eq!(guard.len(), 1);
    }

    #[test]
    fn test_keys_are_scoped_per_user() {
        let guard = IdempotencyGuard::new();
        let key = IdempotencyKey::new("shared").unwrap();
        let a = OperationId::new();
        let b = OperationId::new();

        guard.record(1, key.clone(), a);
        guard.record(2, key.clone(), b);
        assert_eq!(guard.lookup(1, &key), Some(a));
        assert_eq!(guard.lookup(2, &key), Some(b));
    }
}
