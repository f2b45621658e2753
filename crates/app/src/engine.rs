//! Engine — single-writer processing loop over a command queue.
//!
//! All mutating traffic (trigger events and rule-set reloads) flows through
//! one mpsc channel into one worker task, so events are evaluated strictly
//! in arrival order against a stable snapshot of zone, rules, and
//! cooldowns. Readers observe the current zone through a watch channel and
//! never see an intermediate state.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};

use zoneshift_domain::error::{ValidationError, ZoneShiftError};
use zoneshift_domain::event::TriggerEvent;
use zoneshift_domain::id::{EventId, ZoneId};
use zoneshift_domain::time;

use crate::cooldown::CooldownTracker;
use crate::dispatcher::{DispatchConfig, Dispatcher};
use crate::matcher;
use crate::ports::{AuditStore, StateStore};
use crate::registry::ExecutorRegistry;
use crate::rule_store::RuleStore;

/// Engine construction parameters.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Bound of the command queue; producers wait when it is full.
    pub queue_capacity: usize,
    pub dispatch: DispatchConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            dispatch: DispatchConfig::default(),
        }
    }
}

enum EngineCommand {
    Event(TriggerEvent),
    Reload {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<(), ValidationError>>,
    },
}

/// Cloneable submission handle; the write side of the engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineCommand>,
    zone_rx: watch::Receiver<ZoneId>,
}

impl EngineHandle {
    /// Parse a raw event document and enqueue it, returning the assigned
    /// event id for the ingest acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed or oversized documents, or
    /// [`ZoneShiftError::Closed`] once the worker has stopped.
    pub async fn submit_raw(
        &self,
        raw: &str,
        default_source: &str,
    ) -> Result<EventId, ZoneShiftError> {
        let event = TriggerEvent::parse(raw, default_source)?;
        let id = event.id;
        self.submit(event).await?;
        Ok(id)
    }

    /// Enqueue an already-constructed event.
    ///
    /// # Errors
    ///
    /// Returns [`ZoneShiftError::Closed`] once the worker has stopped.
    pub async fn submit(&self, event: TriggerEvent) -> Result<(), ZoneShiftError> {
        self.tx
            .send(EngineCommand::Event(event))
            .await
            .map_err(|_| ZoneShiftError::Closed)
    }

    /// Replace the active rule set with a new document.
    ///
    /// The reload travels through the same queue as events, so every event
    /// is evaluated entirely against one rule set. On rejection the
    /// previous set stays active.
    ///
    /// # Errors
    ///
    /// Returns the validation error for a rejected document, or
    /// [`ZoneShiftError::Closed`] once the worker has stopped.
    pub async fn reload(&self, bytes: Vec<u8>) -> Result<(), ZoneShiftError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(EngineCommand::Reload { bytes, reply })
            .await
            .map_err(|_| ZoneShiftError::Closed)?;
        let result = response.await.map_err(|_| ZoneShiftError::Closed)?;
        Ok(result?)
    }

    /// Snapshot of the current zone.
    #[must_use]
    pub fn current_zone(&self) -> ZoneId {
        self.zone_rx.borrow().clone()
    }

    /// Watch receiver for zone changes, for read surfaces and tooling.
    #[must_use]
    pub fn zone_watch(&self) -> watch::Receiver<ZoneId> {
        self.zone_rx.clone()
    }
}

/// The single consumer of the command queue. Owns the mutable engine
/// state; run it on its own task via [`EngineWorker::run`].
pub struct EngineWorker<S, A> {
    rx: mpsc::Receiver<EngineCommand>,
    zone_tx: watch::Sender<ZoneId>,
    registry: Arc<ExecutorRegistry>,
    rules: RuleStore,
    cooldowns: CooldownTracker,
    dispatcher: Dispatcher<S, A>,
    /// Set when a commit could not be persisted; firings are suppressed
    /// until a resync succeeds.
    degraded: bool,
}

/// Restore persisted state and assemble the engine.
///
/// A persisted zone that the rule set no longer declares falls back to the
/// default zone.
///
/// # Errors
///
/// Returns a persistence error when the stored state cannot be loaded.
pub async fn start<S: StateStore, A: AuditStore>(
    rules: RuleStore,
    registry: Arc<ExecutorRegistry>,
    state_store: S,
    audit: A,
    config: EngineConfig,
) -> Result<(EngineHandle, EngineWorker<S, A>), ZoneShiftError> {
    let initial = match state_store.load_zone().await? {
        Some(zone) if rules.declares_zone(&zone) => zone,
        Some(zone) => {
            tracing::warn!(
                zone = %zone,
                default = %rules.default_zone(),
                "persisted zone not declared by rule set, starting in default zone"
            );
            rules.default_zone().clone()
        }
        None => rules.default_zone().clone(),
    };
    let cooldowns = CooldownTracker::restore(state_store.load_cooldowns().await?);
    tracing::info!(zone = %initial, "engine state restored");

    let (zone_tx, zone_rx) = watch::channel(initial);
    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let dispatcher = Dispatcher::new(Arc::clone(&registry), state_store, audit, config.dispatch);

    let worker = EngineWorker {
        rx,
        zone_tx,
        registry,
        rules,
        cooldowns,
        dispatcher,
        degraded: false,
    };
    Ok((EngineHandle { tx, zone_rx }, worker))
}

impl<S: StateStore, A: AuditStore> EngineWorker<S, A> {
    /// Consume commands until every handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                EngineCommand::Event(event) => self.handle_event(event).await,
                EngineCommand::Reload { bytes, reply } => {
                    let result = self.handle_reload(&bytes).await;
                    // The caller may have given up waiting; that is fine.
                    let _ = reply.send(result);
                }
            }
        }
        tracing::info!("engine worker stopped");
    }

    #[tracing::instrument(skip_all, fields(event = %event.id, trigger = %event.trigger))]
    async fn handle_event(&mut self, event: TriggerEvent) {
        let suppressed = self.degraded && !self.try_resync().await;

        let now = time::now();
        let current = self.zone_tx.borrow().clone();
        let Some(rule) = matcher::select_rule(&self.rules, &current, &event, &self.cooldowns, now)
        else {
            return;
        };
        if suppressed {
            // Matching still runs so the log shows what would have fired,
            // but nothing commits until persistence is back.
            tracing::warn!(
                rule = %rule.id,
                to = %rule.to,
                "firing suppressed while persistence is degraded"
            );
            return;
        }

        let applied = self
            .dispatcher
            .apply(rule, &event, &self.zone_tx, &mut self.cooldowns)
            .await;
        if !applied.persisted {
            tracing::error!("entering degraded mode after persistence failure");
            self.degraded = true;
        }
    }

    async fn handle_reload(&mut self, bytes: &[u8]) -> Result<(), ValidationError> {
        let known_actions = self.registry.action_names();
        match self.rules.load(bytes, &known_actions) {
            Ok(()) => {
                tracing::info!(
                    rules = self.rules.rule_set().rules.len(),
                    zones = self.rules.rule_set().zones.len(),
                    "rule set reloaded"
                );
                self.realign_zone().await;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "rule set rejected, previous set stays active");
                Err(err)
            }
        }
    }

    /// After a reload the current zone may no longer exist; move to the new
    /// default zone in that case.
    async fn realign_zone(&mut self) {
        let current = self.zone_tx.borrow().clone();
        if self.rules.declares_zone(&current) {
            return;
        }
        let default = self.rules.default_zone().clone();
        tracing::warn!(
            zone = %current,
            default = %default,
            "current zone not declared by reloaded set, moving to default"
        );
        self.zone_tx.send_replace(default.clone());
        if let Err(err) = self.dispatcher.resync(&default, &self.cooldowns).await {
            tracing::error!(error = %err, "entering degraded mode after persistence failure");
            self.degraded = true;
        }
    }

    async fn try_resync(&mut self) -> bool {
        let zone = self.zone_tx.borrow().clone();
        match self.dispatcher.resync(&zone, &self.cooldowns).await {
            Ok(()) => {
                tracing::info!("persistent state resynchronized, leaving degraded mode");
                self.degraded = false;
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "persistence still unavailable");
                false
            }
        }
    }
}
