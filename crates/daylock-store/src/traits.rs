//! Rule store trait definition

use chrono::Weekday;
use daylock_api::{DaySet, Rule};
use daylock_util::{RuleId, RuleIdentity};

use crate::StoreResult;

/// Durable mapping from protected-application identity to allowed-weekday
/// set.
///
/// All mutations are durable before the call returns; the engine can
/// crash and restart without losing the last committed rule set. The
/// store owns all rules; callers hold only transient snapshots.
pub trait RuleStore: Send + Sync {
    /// Insert or replace the rule for the normalized identity of
    /// `identity_path`. Re-adding a rule for the same identity replaces
    /// the prior allowed-day set; it never creates a duplicate.
    ///
    /// Whether the path refers to an existing file is the caller's
    /// responsibility at write time. The store does not re-validate on
    /// read: a rule whose target was deleted or moved remains
    /// enforceable by name.
    fn upsert_rule(&self, identity_path: &str, allowed_days: DaySet) -> StoreResult<RuleId>;

    /// Consistent snapshot of all rules, ordered by identity. No rule
    /// appears twice; no partial row is ever observable.
    fn list_rules(&self) -> StoreResult<Vec<Rule>>;

    /// Remove the rule for an identity. No-op when absent.
    fn delete_rule(&self, identity: &RuleIdentity) -> StoreResult<()>;

    /// Whether the identity may run on `day`. Single indexed lookup.
    /// `true` when no rule exists: an unmanaged process is never
    /// terminated.
    fn is_allowed(&self, identity: &RuleIdentity, day: Weekday) -> StoreResult<bool>;

    /// Check if the store is healthy
    fn is_healthy(&self) -> bool;
}
