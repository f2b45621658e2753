//! `SQLite` implementation of [`StateStore`].

use std::collections::HashMap;

use sqlx::SqlitePool;

use zoneshift_app::ports::StateStore;
use zoneshift_domain::error::ZoneShiftError;
use zoneshift_domain::id::{RuleId, ZoneId};
use zoneshift_domain::time::Timestamp;

use crate::error::StorageError;

/// `SQLite`-backed durable engine state: the current zone (single row) and
/// the per-rule cooldown map.
#[derive(Clone)]
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

impl StateStore for SqliteStateStore {
    async fn load_zone(&self) -> Result<Option<ZoneId>, ZoneShiftError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT zone FROM engine_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|(zone,)| ZoneId::from(zone)))
    }

    async fn save_zone(&self, zone: &ZoneId) -> Result<(), ZoneShiftError> {
        sqlx::query(
            "INSERT INTO engine_state (id, zone) VALUES (1, ?) \
             ON CONFLICT(id) DO UPDATE SET zone = excluded.zone",
        )
        .bind(zone.as_str())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn load_cooldowns(&self) -> Result<HashMap<RuleId, Timestamp>, ZoneShiftError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT rule_id, last_fired FROM cooldowns")
                .fetch_all(&self.pool)
                .await
                .map_err(StorageError::from)?;

        let mut cooldowns = HashMap::with_capacity(rows.len());
        for (rule_id, last_fired) in rows {
            let fired_at = parse_timestamp(&last_fired).map_err(StorageError::from)?;
            cooldowns.insert(RuleId::from(rule_id), fired_at);
        }
        Ok(cooldowns)
    }

    async fn save_cooldown(
        &self,
        rule_id: &RuleId,
        fired_at: Timestamp,
    ) -> Result<(), ZoneShiftError> {
        sqlx::query(
            "INSERT INTO cooldowns (rule_id, last_fired) VALUES (?, ?) \
             ON CONFLICT(rule_id) DO UPDATE SET last_fired = excluded.last_fired",
        )
        .bind(rule_id.as_str())
        .bind(fired_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use zoneshift_domain::time;

    async fn setup() -> SqliteStateStore {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteStateStore::new(db.pool().clone())
    }

    #[tokio::test]
    async fn should_return_none_when_no_zone_was_saved() {
        let store = setup().await;
        assert!(store.load_zone().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_overwrite_the_single_zone_row() {
        let store = setup().await;
        store.save_zone(&ZoneId::from("sensitive")).await.unwrap();
        store.save_zone(&ZoneId::from("ultra")).await.unwrap();
        assert_eq!(
            store.load_zone().await.unwrap(),
            Some(ZoneId::from("ultra"))
        );
    }

    #[tokio::test]
    async fn should_roundtrip_cooldown_stamps() {
        let store = setup().await;
        let fired_at = time::now();
        store
            .save_cooldown(&RuleId::from("usb-ultra"), fired_at)
            .await
            .unwrap();

        let cooldowns = store.load_cooldowns().await.unwrap();
        assert_eq!(cooldowns.len(), 1);
        let restored = cooldowns[&RuleId::from("usb-ultra")];
        // RFC 3339 keeps sub-second precision, so the stamp survives intact.
        assert_eq!(restored, fired_at);
    }

    #[tokio::test]
    async fn should_replace_stamp_for_same_rule() {
        let store = setup().await;
        let first = time::now();
        let later = first + chrono::Duration::seconds(30);
        store
            .save_cooldown(&RuleId::from("usb-ultra"), first)
            .await
            .unwrap();
        store
            .save_cooldown(&RuleId::from("usb-ultra"), later)
            .await
            .unwrap();

        let cooldowns = store.load_cooldowns().await.unwrap();
        assert_eq!(cooldowns[&RuleId::from("usb-ultra")], later);
    }
}
