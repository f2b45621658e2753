//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ZoneShiftError`] via `#[from]`. Adapters wrap their infrastructure
//! errors into the boxed `Persistence` variant.

use std::time::Duration;

use crate::id::{RuleId, ZoneId};

/// Top-level error for the zoneshift engine.
#[derive(Debug, thiserror::Error)]
pub enum ZoneShiftError {
    /// A malformed trigger event or rule-set document was rejected.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// An action executor failed after bounded retries.
    #[error("action error")]
    Action(#[from] ActionError),

    /// Durable state could not be recorded. The engine halts new rule
    /// firings until a sync succeeds, but the ingest path stays alive.
    #[error("persistence error")]
    Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The engine worker has stopped and no longer accepts commands.
    #[error("engine is not running")]
    Closed,
}

/// A malformed trigger event or rule-set document.
///
/// Validation failures never change engine state: a rejected event never
/// reaches the matcher, and a rejected rule set leaves the previously
/// loaded valid set active.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The input was not a well-formed JSON document.
    #[error("malformed JSON document")]
    Json(#[from] serde_json::Error),

    /// The event names a trigger type the engine does not know.
    #[error("unknown trigger type `{0}`")]
    UnknownTrigger(String),

    /// The event payload was missing or not a JSON object.
    #[error("event payload must be a JSON object")]
    PayloadNotObject,

    /// The raw event exceeded the ingest size cap.
    #[error("event exceeds {limit} bytes")]
    EventTooLarge { limit: usize },

    /// The rule set declares no zones.
    #[error("rule set declares no zones")]
    NoZones,

    /// Two zones share the same identifier.
    #[error("duplicate zone id `{0}`")]
    DuplicateZone(ZoneId),

    /// The default zone is not part of the declared zone set.
    #[error("default zone `{0}` is not declared")]
    UnknownDefaultZone(ZoneId),

    /// A rule has an empty identifier.
    #[error("rule id must not be empty")]
    EmptyRuleId,

    /// Two rules share the same identifier.
    #[error("duplicate rule id `{0}`")]
    DuplicateRule(RuleId),

    /// A rule references a zone the document does not declare.
    #[error("rule `{rule}` references undeclared zone `{zone}`")]
    UnknownZone { rule: RuleId, zone: ZoneId },

    /// A rule has an empty action list.
    #[error("rule `{0}` has no actions")]
    NoActions(RuleId),

    /// A rule names an action with no registered executor.
    #[error("rule `{rule}` references unregistered action `{action}`")]
    UnknownAction { rule: RuleId, action: String },
}

/// A failure reported by (or on behalf of) an action executor.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The executor returned an error.
    #[error("action `{action}` failed: {detail}")]
    Failed { action: String, detail: String },

    /// The attempt did not complete within the per-action timeout.
    #[error("action `{action}` timed out after {timeout:?}")]
    Timeout { action: String, timeout: Duration },

    /// No executor is registered under this action name.
    #[error("no executor registered for action `{0}`")]
    Unregistered(String),
}
