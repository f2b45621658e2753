//! Action executor port — one named, reversible side effect.
//!
//! External collaborators (VPN toggles, clipboard lockers, filesystem
//! remounts, notifiers) register under a unique action name. The core is
//! agnostic to what an executor actually does; it owns only the retry,
//! timeout, and rollback protocol around these two calls.
//!
//! The registry stores executors as trait objects, so this port uses
//! `async_trait` rather than the RPITIT style of the storage ports.

use async_trait::async_trait;

use zoneshift_domain::error::ActionError;
use zoneshift_domain::event::TriggerEvent;
use zoneshift_domain::id::{RuleId, ZoneId};

/// Context handed to an executor for one rule application.
#[derive(Debug, Clone)]
pub struct ActionContext {
    pub rule_id: RuleId,
    pub event: TriggerEvent,
    /// Zone that was current when the rule application began.
    pub from_zone: ZoneId,
    /// Zone the rule commits on success.
    pub to_zone: ZoneId,
}

/// A capability that performs one named side effect and can undo it.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Perform the side effect. The dispatcher retries this with backoff up
    /// to its configured attempt bound; each attempt runs under a timeout.
    async fn execute(&self, ctx: &ActionContext) -> Result<(), ActionError>;

    /// Compensate a previously successful [`execute`](Self::execute) when a
    /// later action in the same rule application failed. Best effort: a
    /// rollback failure is recorded but does not change the revert outcome.
    async fn rollback(&self, ctx: &ActionContext) -> Result<(), ActionError>;
}
