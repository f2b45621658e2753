//! Status service — read-only view over the running engine.
//!
//! Serves dashboards and CLIs without going through the command queue: the
//! current zone comes from the watch channel, history from the audit
//! store.

use tokio::sync::watch;

use zoneshift_domain::audit::{ActionInvocationRecord, TransitionRecord};
use zoneshift_domain::error::ZoneShiftError;
use zoneshift_domain::id::ZoneId;

use crate::ports::AuditStore;

/// Read surface over the engine's observable state.
#[derive(Clone)]
pub struct StatusService<A> {
    zone_rx: watch::Receiver<ZoneId>,
    audit: A,
}

impl<A: AuditStore> StatusService<A> {
    pub fn new(zone_rx: watch::Receiver<ZoneId>, audit: A) -> Self {
        Self { zone_rx, audit }
    }

    /// The zone the engine is in right now.
    #[must_use]
    pub fn current_zone(&self) -> ZoneId {
        self.zone_rx.borrow().clone()
    }

    /// Most recent zone transitions, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the audit store cannot be read.
    pub async fn recent_transitions(
        &self,
        limit: usize,
    ) -> Result<Vec<TransitionRecord>, ZoneShiftError> {
        self.audit.recent_transitions(limit).await
    }

    /// Most recent action invocations, newest first.
    ///
    /// # Errors
    ///
    /// Returns a persistence error when the audit store cannot be read.
    pub async fn recent_invocations(
        &self,
        limit: usize,
    ) -> Result<Vec<ActionInvocationRecord>, ZoneShiftError> {
        self.audit.recent_invocations(limit).await
    }
}
