//! Audit store port — append-only transition and invocation records.
//!
//! Written only by the engine; readable concurrently by dashboards and
//! CLIs as time-ordered sequences.

use std::future::Future;

use zoneshift_domain::audit::{ActionInvocationRecord, TransitionRecord};
use zoneshift_domain::error::ZoneShiftError;

/// Append-only audit trail.
pub trait AuditStore {
    /// Append one resolved rule application.
    fn record_transition(
        &self,
        record: TransitionRecord,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send;

    /// Append one action invocation outcome.
    fn record_invocation(
        &self,
        record: ActionInvocationRecord,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send;

    /// Most recent transitions, newest first.
    fn recent_transitions(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TransitionRecord>, ZoneShiftError>> + Send;

    /// Most recent invocation records, newest first.
    fn recent_invocations(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ActionInvocationRecord>, ZoneShiftError>> + Send;
}

impl<T: AuditStore + Send + Sync> AuditStore for std::sync::Arc<T> {
    fn record_transition(
        &self,
        record: TransitionRecord,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send {
        (**self).record_transition(record)
    }

    fn record_invocation(
        &self,
        record: ActionInvocationRecord,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send {
        (**self).record_invocation(record)
    }

    fn recent_transitions(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TransitionRecord>, ZoneShiftError>> + Send {
        (**self).recent_transitions(limit)
    }

    fn recent_invocations(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ActionInvocationRecord>, ZoneShiftError>> + Send {
        (**self).recent_invocations(limit)
    }
}
