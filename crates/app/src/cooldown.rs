//! Cooldown tracker — per-rule last-fired timestamps.
//!
//! Mutated only by the dispatcher on *committed* firings; a reverted
//! attempt does not count. The map is persisted through the state-store
//! port so a restart does not re-fire rules prematurely.

use std::collections::HashMap;

use zoneshift_domain::id::RuleId;
use zoneshift_domain::rule::Rule;
use zoneshift_domain::time::Timestamp;

/// In-memory view of the persisted cooldown map.
#[derive(Debug, Default)]
pub struct CooldownTracker {
    last_fired: HashMap<RuleId, Timestamp>,
}

impl CooldownTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the tracker from persisted state.
    #[must_use]
    pub fn restore(last_fired: HashMap<RuleId, Timestamp>) -> Self {
        Self { last_fired }
    }

    /// Whether the rule's cooldown has elapsed at `now`. A rule that never
    /// fired, or has no cooldown, is always ready.
    #[must_use]
    pub fn ready(&self, rule: &Rule, now: Timestamp) -> bool {
        if rule.cooldown_seconds == 0 {
            return true;
        }
        match self.last_fired.get(&rule.id) {
            None => true,
            Some(last) => now.signed_duration_since(*last) >= rule.cooldown(),
        }
    }

    /// Stamp a committed firing.
    pub fn mark_fired(&mut self, rule_id: RuleId, at: Timestamp) {
        self.last_fired.insert(rule_id, at);
    }

    /// Last committed firing of a rule, if any.
    #[must_use]
    pub fn last_fired(&self, rule_id: &RuleId) -> Option<Timestamp> {
        self.last_fired.get(rule_id).copied()
    }

    /// Iterate over all stamps (used for persistence resync).
    pub fn iter(&self) -> impl Iterator<Item = (&RuleId, Timestamp)> {
        self.last_fired.iter().map(|(id, ts)| (id, *ts))
    }
}
