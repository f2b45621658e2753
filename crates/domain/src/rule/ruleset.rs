//! Rule set — the versioned document holding zones and rules.
//!
//! A rule set is validated as a whole before it is ever consulted: parsing
//! and validation failures leave the previously loaded set untouched.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::ZoneId;
use crate::zone::{Zone, ZoneSelector};

use super::Rule;

/// The declarative document driving the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSet {
    pub zones: Vec<Zone>,
    /// Zone the engine starts in when no persisted zone exists.
    pub default_zone: ZoneId,
    pub rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse a raw JSON document. Structural validation happens separately
    /// via [`RuleSet::validate`] because it needs the registered action set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Json`] for a malformed document.
    pub fn parse(bytes: &[u8]) -> Result<Self, ValidationError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check document-level invariants: non-empty and duplicate-free zone
    /// set, declared default zone, unique rule ids, declared source and
    /// target zones, non-empty action lists naming only registered actions.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self, known_actions: &HashSet<String>) -> Result<(), ValidationError> {
        if self.zones.is_empty() {
            return Err(ValidationError::NoZones);
        }

        let mut zone_ids = HashSet::new();
        for zone in &self.zones {
            if !zone_ids.insert(&zone.id) {
                return Err(ValidationError::DuplicateZone(zone.id.clone()));
            }
        }
        if !zone_ids.contains(&self.default_zone) {
            return Err(ValidationError::UnknownDefaultZone(self.default_zone.clone()));
        }

        let mut rule_ids = HashSet::new();
        for rule in &self.rules {
            rule.validate()?;
            if !rule_ids.insert(&rule.id) {
                return Err(ValidationError::DuplicateRule(rule.id.clone()));
            }
            if let ZoneSelector::Zone(from) = &rule.from {
                if !zone_ids.contains(from) {
                    return Err(ValidationError::UnknownZone {
                        rule: rule.id.clone(),
                        zone: from.clone(),
                    });
                }
            }
            if !zone_ids.contains(&rule.to) {
                return Err(ValidationError::UnknownZone {
                    rule: rule.id.clone(),
                    zone: rule.to.clone(),
                });
            }
            for action in &rule.actions {
                if !known_actions.contains(action) {
                    return Err(ValidationError::UnknownAction {
                        rule: rule.id.clone(),
                        action: action.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Whether the document declares the given zone.
    #[must_use]
    pub fn declares_zone(&self, zone: &ZoneId) -> bool {
        self.zones.iter().any(|z| &z.id == zone)
    }
}
