//! Action dispatcher — ordered execution with retry, timeout, and rollback.
//!
//! One rule application either commits (all actions succeeded, zone moves
//! to the rule's target, cooldown stamped) or reverts (a failed action
//! triggers reverse-order rollback of everything that already succeeded,
//! the zone stays put, the cooldown is untouched). Actions run strictly in
//! declared order; the dispatcher never parallelizes within one firing.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use zoneshift_domain::audit::{
    ActionInvocationRecord, ActionStatus, TransitionOutcome, TransitionRecord,
};
use zoneshift_domain::error::ActionError;
use zoneshift_domain::event::TriggerEvent;
use zoneshift_domain::id::ZoneId;
use zoneshift_domain::rule::Rule;
use zoneshift_domain::time;

use crate::cooldown::CooldownTracker;
use crate::ports::{ActionContext, AuditStore, StateStore};
use crate::registry::ExecutorRegistry;

/// Retry and timeout policy for action execution.
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Attempts per action before it is declared failed (at least 1).
    pub max_attempts: u32,
    /// Base backoff between attempts; grows linearly with the attempt number.
    pub retry_backoff: Duration,
    /// Per-attempt timeout; expiry counts as a failed attempt.
    pub action_timeout: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_backoff: Duration::from_millis(200),
            action_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of one rule application.
#[derive(Debug)]
pub struct Applied {
    pub outcome: TransitionOutcome,
    /// False when the committed zone/cooldown could not be persisted; the
    /// engine then enters degraded mode until a resync succeeds.
    pub persisted: bool,
}

/// Executes a matched rule's action list and resolves the transition.
pub struct Dispatcher<S, A> {
    registry: Arc<ExecutorRegistry>,
    state_store: S,
    audit: A,
    config: DispatchConfig,
}

impl<S: StateStore, A: AuditStore> Dispatcher<S, A> {
    pub fn new(
        registry: Arc<ExecutorRegistry>,
        state_store: S,
        audit: A,
        config: DispatchConfig,
    ) -> Self {
        Self {
            registry,
            state_store,
            audit,
            config,
        }
    }

    /// Apply a matched rule to the engine state.
    ///
    /// The zone watch channel is only written on commit, after the whole
    /// action list resolved, so concurrent readers observe either the prior
    /// or the target zone and never anything in between.
    pub async fn apply(
        &self,
        rule: &Rule,
        event: &TriggerEvent,
        zone: &watch::Sender<ZoneId>,
        cooldowns: &mut CooldownTracker,
    ) -> Applied {
        let prior = zone.borrow().clone();
        let ctx = ActionContext {
            rule_id: rule.id.clone(),
            event: event.clone(),
            from_zone: prior.clone(),
            to_zone: rule.to.clone(),
        };

        let mut succeeded: Vec<&str> = Vec::new();
        for action in &rule.actions {
            match self.run_action(action, &ctx).await {
                Ok(attempts) => {
                    self.record_invocation(rule, action, attempts, ActionStatus::Succeeded, None)
                        .await;
                    succeeded.push(action);
                }
                Err((attempts, err)) => {
                    tracing::warn!(
                        rule = %rule.id,
                        action = %action,
                        attempts,
                        error = %err,
                        "action failed after retries, reverting transition"
                    );
                    self.record_invocation(
                        rule,
                        action,
                        attempts,
                        ActionStatus::Failed,
                        Some(err.to_string()),
                    )
                    .await;
                    self.rollback_succeeded(rule, &succeeded, &ctx).await;
                    self.record_transition(rule, event, &prior, TransitionOutcome::Reverted)
                        .await;
                    return Applied {
                        outcome: TransitionOutcome::Reverted,
                        persisted: true,
                    };
                }
            }
        }

        let now = time::now();
        zone.send_replace(rule.to.clone());
        cooldowns.mark_fired(rule.id.clone(), now);
        self.record_transition(rule, event, &prior, TransitionOutcome::Committed)
            .await;
        tracing::info!(rule = %rule.id, from = %prior, to = %rule.to, "zone transition committed");

        let mut persisted = true;
        if let Err(err) = self.state_store.save_zone(&rule.to).await {
            tracing::error!(error = %err, "failed to persist current zone");
            persisted = false;
        }
        if let Err(err) = self.state_store.save_cooldown(&rule.id, now).await {
            tracing::error!(rule = %rule.id, error = %err, "failed to persist cooldown stamp");
            persisted = false;
        }

        Applied {
            outcome: TransitionOutcome::Committed,
            persisted,
        }
    }

    /// Re-save the current zone and the full cooldown map after a
    /// persistence failure.
    ///
    /// # Errors
    ///
    /// Returns the first persistence error; the engine stays degraded.
    pub async fn resync(
        &self,
        zone: &ZoneId,
        cooldowns: &CooldownTracker,
    ) -> Result<(), zoneshift_domain::error::ZoneShiftError> {
        self.state_store.save_zone(zone).await?;
        for (rule_id, fired_at) in cooldowns.iter() {
            self.state_store.save_cooldown(rule_id, fired_at).await?;
        }
        Ok(())
    }

    /// Run one action with the configured timeout and retry policy.
    /// Returns the number of attempts used.
    async fn run_action(&self, action: &str, ctx: &ActionContext) -> Result<u32, (u32, ActionError)> {
        let Some(executor) = self.registry.get(action) else {
            return Err((0, ActionError::Unregistered(action.to_string())));
        };

        let mut attempt = 0;
        loop {
            attempt += 1;
            let err = match tokio::time::timeout(self.config.action_timeout, executor.execute(ctx))
                .await
            {
                Ok(Ok(())) => return Ok(attempt),
                Ok(Err(err)) => err,
                Err(_) => ActionError::Timeout {
                    action: action.to_string(),
                    timeout: self.config.action_timeout,
                },
            };
            tracing::debug!(action, attempt, error = %err, "action attempt failed");
            if attempt >= self.config.max_attempts {
                return Err((attempt, err));
            }
            tokio::time::sleep(self.config.retry_backoff * attempt).await;
        }
    }

    /// Roll back already-succeeded actions in reverse order. Best effort:
    /// each rollback gets one timed attempt and failures only degrade the
    /// audit entry.
    async fn rollback_succeeded(&self, rule: &Rule, succeeded: &[&str], ctx: &ActionContext) {
        for action in succeeded.iter().rev() {
            let Some(executor) = self.registry.get(action) else {
                continue;
            };
            let error = match tokio::time::timeout(self.config.action_timeout, executor.rollback(ctx))
                .await
            {
                Ok(Ok(())) => None,
                Ok(Err(err)) => Some(err.to_string()),
                Err(_) => Some(
                    ActionError::Timeout {
                        action: (*action).to_string(),
                        timeout: self.config.action_timeout,
                    }
                    .to_string(),
                ),
            };
            if let Some(detail) = &error {
                tracing::warn!(rule = %rule.id, action = %action, error = %detail, "rollback failed");
            }
            self.record_invocation(rule, action, 1, ActionStatus::RolledBack, error)
                .await;
        }
    }

    async fn record_invocation(
        &self,
        rule: &Rule,
        action: &str,
        attempts: u32,
        status: ActionStatus,
        error: Option<String>,
    ) {
        let record = ActionInvocationRecord {
            timestamp: time::now(),
            rule_id: rule.id.clone(),
            action: action.to_string(),
            attempts,
            status,
            error,
        };
        if let Err(err) = self.audit.record_invocation(record).await {
            tracing::error!(error = %err, "failed to append invocation record");
        }
    }

    async fn record_transition(
        &self,
        rule: &Rule,
        event: &TriggerEvent,
        prior: &ZoneId,
        outcome: TransitionOutcome,
    ) {
        let record = TransitionRecord {
            timestamp: time::now(),
            from_zone: prior.clone(),
            to_zone: rule.to.clone(),
            event_id: event.id,
            rule_id: rule.id.clone(),
            outcome,
        };
        if let Err(err) = self.audit.record_transition(record).await {
            tracing::error!(error = %err, "failed to append transition record");
        }
    }
}
