//! Audit records — append-only entries describing what the engine did.
//!
//! Transitions record every resolved rule application (committed or
//! reverted); invocation records capture each action's final status within a
//! firing. Both are written only by the engine and read by dashboards/CLIs.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, RuleId, ZoneId};
use crate::time::Timestamp;

/// Terminal outcome of one rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionOutcome {
    /// All actions succeeded; the zone changed and the cooldown was stamped.
    Committed,
    /// An action failed after retries; succeeded actions were rolled back
    /// and the zone stayed at its prior value.
    Reverted,
}

impl TransitionOutcome {
    /// Stable textual form used in storage and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::Reverted => "reverted",
        }
    }
}

impl std::str::FromStr for TransitionOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "committed" => Ok(Self::Committed),
            "reverted" => Ok(Self::Reverted),
            other => Err(format!("unknown transition outcome `{other}`")),
        }
    }
}

impl std::fmt::Display for TransitionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    pub timestamp: Timestamp,
    pub from_zone: ZoneId,
    pub to_zone: ZoneId,
    pub event_id: EventId,
    pub rule_id: RuleId,
    pub outcome: TransitionOutcome,
}

/// Final status of one action within a rule application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionStatus {
    Succeeded,
    Failed,
    RolledBack,
}

impl ActionStatus {
    /// Stable textual form used in storage and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::RolledBack => "rolledBack",
        }
    }
}

impl std::str::FromStr for ActionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "succeeded" => Ok(Self::Succeeded),
            "failed" => Ok(Self::Failed),
            "rolledBack" => Ok(Self::RolledBack),
            other => Err(format!("unknown action status `{other}`")),
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action invocation within a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionInvocationRecord {
    pub timestamp: Timestamp,
    pub rule_id: RuleId,
    pub action: String,
    /// Number of execution attempts made (0 when no executor was found).
    pub attempts: u32,
    pub status: ActionStatus,
    /// Error detail for failed attempts or failed rollbacks.
    pub error: Option<String>,
}
