//! Rule store — owns the validated, atomically replaceable rule set.
//!
//! Only the single engine worker consults the store, so a reload is a plain
//! field swap: any event processed before the swap sees the old set, any
//! event after sees the new one, and no event ever observes a partially
//! loaded document. A failed load leaves the previous valid set active.

use std::collections::{HashMap, HashSet};

use zoneshift_domain::error::ValidationError;
use zoneshift_domain::event::TriggerType;
use zoneshift_domain::id::ZoneId;
use zoneshift_domain::rule::{Rule, RuleSet};

/// The engine's validated rule set, indexed by trigger type.
pub struct RuleStore {
    set: RuleSet,
    by_trigger: HashMap<TriggerType, Vec<usize>>,
}

impl RuleStore {
    /// Validate and adopt an initial rule set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when the document violates an invariant.
    pub fn new(set: RuleSet, known_actions: &HashSet<String>) -> Result<Self, ValidationError> {
        set.validate(known_actions)?;
        let by_trigger = index_by_trigger(&set);
        Ok(Self { set, by_trigger })
    }

    /// Parse, validate, and atomically adopt a new rule-set document.
    /// On any failure the previously loaded set remains active.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] for a malformed or invalid document.
    pub fn load(
        &mut self,
        bytes: &[u8],
        known_actions: &HashSet<String>,
    ) -> Result<(), ValidationError> {
        let set = RuleSet::parse(bytes)?;
        set.validate(known_actions)?;
        self.by_trigger = index_by_trigger(&set);
        self.set = set;
        Ok(())
    }

    /// Candidate rules for a trigger type, in document order.
    pub fn rules_for(&self, trigger: TriggerType) -> impl Iterator<Item = &Rule> {
        self.by_trigger
            .get(&trigger)
            .into_iter()
            .flatten()
            .map(|&idx| &self.set.rules[idx])
    }

    /// The currently active rule set.
    #[must_use]
    pub fn rule_set(&self) -> &RuleSet {
        &self.set
    }

    /// Zone the engine starts in when nothing is persisted.
    #[must_use]
    pub fn default_zone(&self) -> &ZoneId {
        &self.set.default_zone
    }

    /// Whether the active set declares the given zone.
    #[must_use]
    pub fn declares_zone(&self, zone: &ZoneId) -> bool {
        self.set.declares_zone(zone)
    }
}

fn index_by_trigger(set: &RuleSet) -> HashMap<TriggerType, Vec<usize>> {
    let mut index: HashMap<TriggerType, Vec<usize>> = HashMap::new();
    for (idx, rule) in set.rules.iter().enumerate() {
        index.entry(rule.trigger).or_default().push(idx);
    }
    index
}
