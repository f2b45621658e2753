//! `SQLite` implementation of [`AuditStore`].

use std::str::FromStr;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use zoneshift_app::ports::AuditStore;
use zoneshift_domain::audit::{
    ActionInvocationRecord, ActionStatus, TransitionOutcome, TransitionRecord,
};
use zoneshift_domain::error::ZoneShiftError;
use zoneshift_domain::id::{EventId, RuleId, ZoneId};

use crate::error::StorageError;

struct TransitionWrapper(TransitionRecord);

impl<'r> FromRow<'r, SqliteRow> for TransitionWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let timestamp: String = row.try_get("timestamp")?;
        let from_zone: String = row.try_get("from_zone")?;
        let to_zone: String = row.try_get("to_zone")?;
        let event_id: uuid::Uuid = row.try_get("event_id")?;
        let rule_id: String = row.try_get("rule_id")?;
        let outcome: String = row.try_get("outcome")?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let outcome = TransitionOutcome::from_str(&outcome)
            .map_err(|err| sqlx::Error::Decode(err.into()))?;

        Ok(Self(TransitionRecord {
            timestamp,
            from_zone: ZoneId::from(from_zone),
            to_zone: ZoneId::from(to_zone),
            event_id: EventId::from_uuid(event_id),
            rule_id: RuleId::from(rule_id),
            outcome,
        }))
    }
}

struct InvocationWrapper(ActionInvocationRecord);

impl<'r> FromRow<'r, SqliteRow> for InvocationWrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let timestamp: String = row.try_get("timestamp")?;
        let rule_id: String = row.try_get("rule_id")?;
        let action: String = row.try_get("action")?;
        let attempts: i64 = row.try_get("attempts")?;
        let status: String = row.try_get("status")?;
        let error: Option<String> = row.try_get("error")?;

        let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
            .map(|dt| dt.to_utc())
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let attempts =
            u32::try_from(attempts).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let status =
            ActionStatus::from_str(&status).map_err(|err| sqlx::Error::Decode(err.into()))?;

        Ok(Self(ActionInvocationRecord {
            timestamp,
            rule_id: RuleId::from(rule_id),
            action,
            attempts,
            status,
            error,
        }))
    }
}

/// `SQLite`-backed append-only audit trail.
#[derive(Clone)]
pub struct SqliteAuditStore {
    pool: SqlitePool,
}

impl SqliteAuditStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AuditStore for SqliteAuditStore {
    async fn record_transition(&self, record: TransitionRecord) -> Result<(), ZoneShiftError> {
        sqlx::query(
            "INSERT INTO transitions (timestamp, from_zone, to_zone, event_id, rule_id, outcome) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.timestamp.to_rfc3339())
        .bind(record.from_zone.as_str())
        .bind(record.to_zone.as_str())
        .bind(record.event_id.as_uuid())
        .bind(record.rule_id.as_str())
        .bind(record.outcome.as_str())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn record_invocation(
        &self,
        record: ActionInvocationRecord,
    ) -> Result<(), ZoneShiftError> {
        sqlx::query(
            "INSERT INTO action_invocations (timestamp, rule_id, action, attempts, status, error) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(record.timestamp.to_rfc3339())
        .bind(record.rule_id.as_str())
        .bind(&record.action)
        .bind(i64::from(record.attempts))
        .bind(record.status.as_str())
        .bind(&record.error)
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn recent_transitions(
        &self,
        limit: usize,
    ) -> Result<Vec<TransitionRecord>, ZoneShiftError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<TransitionWrapper> =
            sqlx::query_as("SELECT * FROM transitions ORDER BY id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn recent_invocations(
        &self,
        limit: usize,
    ) -> Result<Vec<ActionInvocationRecord>, ZoneShiftError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows: Vec<InvocationWrapper> =
            sqlx::query_as("SELECT * FROM action_invocations ORDER BY id DESC LIMIT ?")
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
