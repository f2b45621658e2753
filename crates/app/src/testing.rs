//! In-memory port fakes and scripted executors shared across unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use zoneshift_domain::audit::{ActionInvocationRecord, TransitionRecord};
use zoneshift_domain::error::{ActionError, ZoneShiftError};
use zoneshift_domain::id::{RuleId, ZoneId};
use zoneshift_domain::time::Timestamp;

use crate::ports::{ActionContext, ActionExecutor, AuditStore, StateStore};

fn unavailable() -> ZoneShiftError {
    ZoneShiftError::Persistence("store unavailable".into())
}

/// In-memory [`StateStore`] with switchable save failures.
#[derive(Default)]
pub(crate) struct MemoryStateStore {
    zone: Mutex<Option<ZoneId>>,
    cooldowns: Mutex<HashMap<RuleId, Timestamp>>,
    fail_saves: AtomicBool,
}

impl MemoryStateStore {
    pub(crate) fn with_zone(zone: ZoneId) -> Self {
        let store = Self::default();
        *store.zone.lock().unwrap() = Some(zone);
        store
    }

    pub(crate) fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn seed_cooldown(&self, rule_id: RuleId, fired_at: Timestamp) {
        self.cooldowns.lock().unwrap().insert(rule_id, fired_at);
    }

    pub(crate) fn saved_zone(&self) -> Option<ZoneId> {
        self.zone.lock().unwrap().clone()
    }

    pub(crate) fn saved_cooldowns(&self) -> HashMap<RuleId, Timestamp> {
        self.cooldowns.lock().unwrap().clone()
    }
}

impl StateStore for MemoryStateStore {
    async fn load_zone(&self) -> Result<Option<ZoneId>, ZoneShiftError> {
        Ok(self.zone.lock().unwrap().clone())
    }

    async fn save_zone(&self, zone: &ZoneId) -> Result<(), ZoneShiftError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        *self.zone.lock().unwrap() = Some(zone.clone());
        Ok(())
    }

    async fn load_cooldowns(&self) -> Result<HashMap<RuleId, Timestamp>, ZoneShiftError> {
        Ok(self.cooldowns.lock().unwrap().clone())
    }

    async fn save_cooldown(
        &self,
        rule_id: &RuleId,
        fired_at: Timestamp,
    ) -> Result<(), ZoneShiftError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.cooldowns
            .lock()
            .unwrap()
            .insert(rule_id.clone(), fired_at);
        Ok(())
    }
}

/// In-memory append-only [`AuditStore`].
#[derive(Default)]
pub(crate) struct MemoryAuditStore {
    transitions: Mutex<Vec<TransitionRecord>>,
    invocations: Mutex<Vec<ActionInvocationRecord>>,
    fail_writes: AtomicBool,
}

impl MemoryAuditStore {
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn transitions(&self) -> Vec<TransitionRecord> {
        self.transitions.lock().unwrap().clone()
    }

    pub(crate) fn invocations(&self) -> Vec<ActionInvocationRecord> {
        self.invocations.lock().unwrap().clone()
    }
}

impl AuditStore for MemoryAuditStore {
    async fn record_transition(&self, record: TransitionRecord) -> Result<(), ZoneShiftError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.transitions.lock().unwrap().push(record);
        Ok(())
    }

    async fn record_invocation(
        &self,
        record: ActionInvocationRecord,
    ) -> Result<(), ZoneShiftError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.invocations.lock().unwrap().push(record);
        Ok(())
    }

    async fn recent_transitions(
        &self,
        limit: usize,
    ) -> Result<Vec<TransitionRecord>, ZoneShiftError> {
        let records = self.transitions.lock().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }

    async fn recent_invocations(
        &self,
        limit: usize,
    ) -> Result<Vec<ActionInvocationRecord>, ZoneShiftError> {
        let records = self.invocations.lock().unwrap();
        Ok(records.iter().rev().take(limit).cloned().collect())
    }
}

/// Test executor with scripted behavior; records calls in a shared log as
/// `execute:<name>` / `rollback:<name>` entries.
pub(crate) struct ScriptedExecutor {
    pub(crate) name: String,
    remaining_failures: AtomicU32,
    hang: bool,
    rollback_fails: bool,
    log: Arc<Mutex<Vec<String>>>,
}

impl ScriptedExecutor {
    fn new(name: &str, remaining_failures: u32) -> Self {
        Self {
            name: name.to_string(),
            remaining_failures: AtomicU32::new(remaining_failures),
            hang: false,
            rollback_fails: false,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn succeeding(name: &str) -> Self {
        Self::new(name, 0)
    }

    /// Fails every attempt.
    pub(crate) fn failing(name: &str) -> Self {
        Self::new(name, u32::MAX)
    }

    /// Fails the first `times` attempts, then succeeds.
    pub(crate) fn failing_times(name: &str, times: u32) -> Self {
        Self::new(name, times)
    }

    /// Never returns; only the dispatcher timeout ends an attempt.
    pub(crate) fn hanging(name: &str) -> Self {
        let mut executor = Self::new(name, 0);
        executor.hang = true;
        executor
    }

    pub(crate) fn with_failing_rollback(mut self) -> Self {
        self.rollback_fails = true;
        self
    }

    pub(crate) fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.log = log;
        self
    }
}

#[async_trait]
impl ActionExecutor for ScriptedExecutor {
    async fn execute(&self, _ctx: &ActionContext) -> Result<(), ActionError> {
        if self.hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures
                .store(remaining.saturating_sub(1), Ordering::SeqCst);
            return Err(ActionError::Failed {
                action: self.name.clone(),
                detail: "scripted failure".to_string(),
            });
        }
        self.log
            .lock()
            .unwrap()
            .push(format!("execute:{}", self.name));
        Ok(())
    }

    async fn rollback(&self, _ctx: &ActionContext) -> Result<(), ActionError> {
        self.log
            .lock()
            .unwrap()
            .push(format!("rollback:{}", self.name));
        if self.rollback_fails {
            return Err(ActionError::Failed {
                action: self.name.clone(),
                detail: "scripted rollback failure".to_string(),
            });
        }
        Ok(())
    }
}
