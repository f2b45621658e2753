//! # zoneshiftd — zoneshift daemon
//!
//! Composition root that wires the stores, executors, and the event socket
//! together and runs the policy engine.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env vars)
//! - Initialize tracing
//! - Initialize the `SQLite` connection pool and run migrations
//! - Build the executor registry from configured actions
//! - Load and validate the rule-set document
//! - Start the engine worker and the socket listener
//! - Reload the rule set on SIGHUP; shut down on SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal::unix::{SignalKind, signal};

use zoneshift_adapter_executors::{CommandExecutor, CommandSpec, LogExecutor};
use zoneshift_adapter_ingest_uds::UdsIngest;
use zoneshift_adapter_storage_sqlite_sqlx::{SqliteAuditStore, SqliteStateStore};
use zoneshift_app::engine::{self, EngineHandle};
use zoneshift_app::registry::ExecutorRegistry;
use zoneshift_app::rule_store::RuleStore;
use zoneshift_domain::rule::RuleSet;

use crate::config::{ActionKind, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // Database
    let db = zoneshift_adapter_storage_sqlite_sqlx::Config {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let state_store = SqliteStateStore::new(db.pool().clone());
    let audit_store = SqliteAuditStore::new(db.pool().clone());

    // Executors
    let registry = Arc::new(build_registry(&config)?);
    tracing::info!(actions = registry.len(), "executor registry ready");

    // Rules
    let rules = load_rules(&config.rules.path, &registry)?;
    tracing::info!(
        path = %config.rules.path,
        rules = rules.rule_set().rules.len(),
        zones = rules.rule_set().zones.len(),
        "rule set loaded"
    );

    // Engine
    let (handle, worker) = engine::start(
        rules,
        registry,
        state_store,
        audit_store,
        config.engine_config(),
    )
    .await?;
    let worker_task = tokio::spawn(worker.run());

    // Socket
    let ingest = UdsIngest::bind(
        Path::new(&config.socket.path),
        handle.clone(),
        &config.socket.default_source,
    )?;
    let ingest_task = tokio::spawn(ingest.run());

    tracing::info!(
        zone = %handle.current_zone(),
        socket = %config.socket.path,
        "zoneshiftd running"
    );

    run_signal_loop(&handle, &config.rules.path).await?;

    tracing::info!("shutting down");
    ingest_task.abort();
    drop(handle);
    if tokio::time::timeout(Duration::from_secs(5), worker_task)
        .await
        .is_err()
    {
        tracing::warn!("engine worker did not stop in time");
    }
    let _ = std::fs::remove_file(&config.socket.path);
    Ok(())
}

fn build_registry(config: &Config) -> Result<ExecutorRegistry, Box<dyn std::error::Error>> {
    let mut registry = ExecutorRegistry::new();
    for action in &config.actions {
        match &action.kind {
            ActionKind::Log => {
                registry.register(&action.name, Arc::new(LogExecutor::new(&action.name)));
            }
            ActionKind::Command { execute, rollback } => {
                let spec = CommandSpec {
                    execute: execute.clone(),
                    rollback: rollback.clone(),
                };
                let executor = CommandExecutor::new(&action.name, spec)?;
                registry.register(&action.name, Arc::new(executor));
            }
        }
    }
    Ok(registry)
}

fn load_rules(
    path: &str,
    registry: &ExecutorRegistry,
) -> Result<RuleStore, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path)?;
    let set = RuleSet::parse(&bytes)?;
    Ok(RuleStore::new(set, &registry.action_names())?)
}

/// Wait for a termination signal, servicing SIGHUP reloads in between.
async fn run_signal_loop(
    handle: &EngineHandle,
    rules_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => return Ok(()),
            _ = terminate.recv() => return Ok(()),
            _ = hangup.recv() => reload_rules(handle, rules_path).await,
        }
    }
}

async fn reload_rules(handle: &EngineHandle, rules_path: &str) {
    tracing::info!(path = %rules_path, "SIGHUP received, reloading rule set");
    let bytes = match std::fs::read(rules_path) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(error = %err, "failed to read rule-set file, keeping current set");
            return;
        }
    };
    match handle.reload(bytes).await {
        Ok(()) => tracing::info!("rule set reloaded"),
        Err(err) => tracing::error!(error = %err, "reload rejected, keeping current set"),
    }
}
