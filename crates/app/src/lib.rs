//! # zoneshift-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `StateStore` — durable current zone and cooldown map
//!   - `AuditStore` — append & query transition and invocation records
//!   - `ActionExecutor` — one named, reversible side effect
//! - Provide the engine building blocks:
//!   - `ExecutorRegistry` — action name → executor capability lookup
//!   - `RuleStore` — the validated, atomically replaceable rule set
//!   - `CooldownTracker` — per-rule last-fired timestamps
//!   - `matcher` — pure rule selection
//!   - `Dispatcher` — ordered action execution with retry and rollback
//!   - `EngineWorker` / `EngineHandle` — the single-consumer processing
//!     loop and its cloneable submission handle
//!   - `StatusService` — read surface for dashboards/CLIs
//!
//! ## Dependency rule
//! Depends on `zoneshift-domain` only (plus `tokio::sync`/`tokio::time` for
//! channels and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod cooldown;
pub mod dispatcher;
pub mod engine;
pub mod matcher;
pub mod ports;
pub mod registry;
pub mod rule_store;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;
