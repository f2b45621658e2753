//! State store port — durable current zone and cooldown map.
//!
//! Restart must reproduce the exact pre-restart matching behavior: the
//! engine reloads the persisted zone and cooldown timestamps before it
//! processes its first event.

use std::collections::HashMap;
use std::future::Future;

use zoneshift_domain::error::ZoneShiftError;
use zoneshift_domain::id::{RuleId, ZoneId};
use zoneshift_domain::time::Timestamp;

/// Durable storage for the engine's single-writer state.
pub trait StateStore {
    /// Load the persisted current zone, if any was ever saved.
    fn load_zone(&self) -> impl Future<Output = Result<Option<ZoneId>, ZoneShiftError>> + Send;

    /// Persist the current zone.
    fn save_zone(&self, zone: &ZoneId)
    -> impl Future<Output = Result<(), ZoneShiftError>> + Send;

    /// Load the full cooldown map (rule id → last committed firing).
    fn load_cooldowns(
        &self,
    ) -> impl Future<Output = Result<HashMap<RuleId, Timestamp>, ZoneShiftError>> + Send;

    /// Persist one cooldown stamp.
    fn save_cooldown(
        &self,
        rule_id: &RuleId,
        fired_at: Timestamp,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send;
}

impl<T: StateStore + Send + Sync> StateStore for std::sync::Arc<T> {
    fn load_zone(&self) -> impl Future<Output = Result<Option<ZoneId>, ZoneShiftError>> + Send {
        (**self).load_zone()
    }

    fn save_zone(
        &self,
        zone: &ZoneId,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send {
        (**self).save_zone(zone)
    }

    fn load_cooldowns(
        &self,
    ) -> impl Future<Output = Result<HashMap<RuleId, Timestamp>, ZoneShiftError>> + Send {
        (**self).load_cooldowns()
    }

    fn save_cooldown(
        &self,
        rule_id: &RuleId,
        fired_at: Timestamp,
    ) -> impl Future<Output = Result<(), ZoneShiftError>> + Send {
        (**self).save_cooldown(rule_id, fired_at)
    }
}
