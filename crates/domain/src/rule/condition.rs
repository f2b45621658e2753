//! Condition — a declarative predicate over the event payload.
//!
//! Conditions are a small tagged-variant pattern language rather than
//! executable code, so a rule set can be audited by reading it. A condition
//! only ever inspects string payload fields; a missing or non-string field
//! never matches.

use serde::{Deserialize, Serialize};

use crate::event::Payload;

/// A predicate that must accept the event payload for the rule to fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Condition {
    /// Accepts every payload. The default when a rule declares no condition.
    #[default]
    Always,
    /// Field equals the value exactly.
    Equals { field: String, value: String },
    /// Field starts with the value.
    Prefix { field: String, value: String },
    /// Field ends with the value.
    Suffix { field: String, value: String },
    /// Field contains the value as a substring (URL-pattern style).
    Contains { field: String, value: String },
    /// Field equals one of the listed values.
    OneOf { field: String, values: Vec<String> },
}

impl Condition {
    /// Evaluate this condition against an event payload.
    #[must_use]
    pub fn matches(&self, payload: &Payload) -> bool {
        let field_value = |field: &str| payload.get(field).and_then(serde_json::Value::as_str);
        match self {
            Self::Always => true,
            Self::Equals { field, value } => field_value(field) == Some(value.as_str()),
            Self::Prefix { field, value } => {
                field_value(field).is_some_and(|v| v.starts_with(value))
            }
            Self::Suffix { field, value } => field_value(field).is_some_and(|v| v.ends_with(value)),
            Self::Contains { field, value } => field_value(field).is_some_and(|v| v.contains(value)),
            Self::OneOf { field, values } => {
                field_value(field).is_some_and(|v| values.iter().any(|candidate| candidate == v))
            }
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Equals { field, value } => write!(f, "equals({field}, {value})"),
            Self::Prefix { field, value } => write!(f, "prefix({field}, {value})"),
            Self::Suffix { field, value } => write!(f, "suffix({field}, {value})"),
            Self::Contains { field, value } => write!(f, "contains({field}, {value})"),
            Self::OneOf { field, values } => write!(f, "oneOf({field}, {})", values.join("|")),
        }
    }
}
