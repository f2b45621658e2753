//! Zone — a named security posture; exactly one is active at a time.

use serde::{Deserialize, Serialize};

use crate::id::ZoneId;

/// A declared security posture (e.g. `normal`, `sensitive`, `ultra`).
///
/// The set of zones is fixed at rule-set load time and the current zone is
/// always a member of the declared set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    /// Human-readable name for dashboards and logs.
    pub name: String,
}

impl Zone {
    /// Create a zone with the given id and display name.
    pub fn new(id: impl Into<ZoneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The source-zone selector of a rule: a specific zone or the `"*"` wildcard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ZoneSelector {
    /// Matches whatever zone is current.
    Any,
    /// Matches only the named zone.
    Zone(ZoneId),
}

impl ZoneSelector {
    /// Check whether this selector accepts the given current zone.
    #[must_use]
    pub fn matches(&self, zone: &ZoneId) -> bool {
        match self {
            Self::Any => true,
            Self::Zone(id) => id == zone,
        }
    }
}

impl From<String> for ZoneSelector {
    fn from(value: String) -> Self {
        if value == "*" {
            Self::Any
        } else {
            Self::Zone(ZoneId::from(value))
        }
    }
}

impl From<ZoneSelector> for String {
    fn from(value: ZoneSelector) -> Self {
        match value {
            ZoneSelector::Any => "*".to_string(),
            ZoneSelector::Zone(id) => id.to_string(),
        }
    }
}

impl std::fmt::Display for ZoneSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => f.write_str("*"),
            Self::Zone(id) => id.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_match_any_selector_against_every_zone() {
        let selector = ZoneSelector::Any;
        assert!(selector.matches(&ZoneId::from("normal")));
        assert!(selector.matches(&ZoneId::from("ultra")));
    }

    #[test]
    fn should_match_specific_selector_only_against_its_zone() {
        let selector = ZoneSelector::Zone(ZoneId::from("normal"));
        assert!(selector.matches(&ZoneId::from("normal")));
        assert!(!selector.matches(&ZoneId::from("ultra")));
    }

    #[test]
    fn should_deserialize_wildcard_from_star_string() {
        let selector: ZoneSelector = serde_json::from_str("\"*\"").unwrap();
        assert_eq!(selector, ZoneSelector::Any);
    }

    #[test]
    fn should_deserialize_specific_zone_from_plain_string() {
        let selector: ZoneSelector = serde_json::from_str("\"sensitive\"").unwrap();
        assert_eq!(selector, ZoneSelector::Zone(ZoneId::from("sensitive")));
    }

    #[test]
    fn should_serialize_wildcard_back_to_star() {
        let json = serde_json::to_string(&ZoneSelector::Any).unwrap();
        assert_eq!(json, "\"*\"");
    }

    #[test]
    fn should_display_selector_variants() {
        assert_eq!(ZoneSelector::Any.to_string(), "*");
        assert_eq!(
            ZoneSelector::Zone(ZoneId::from("ultra")).to_string(),
            "ultra"
        );
    }
}
