//! # zoneshift-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `StateStore` and `AuditStore` ports defined in
//!   `zoneshift-app`
//! - Manage the `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! ## Dependency rule
//! Depends on `zoneshift-app` (for port traits) and `zoneshift-domain` (for
//! domain types). The `app` and `domain` crates must never reference this
//! adapter.

pub mod audit_store;
pub mod error;
pub mod pool;
pub mod state_store;

pub use audit_store::SqliteAuditStore;
pub use error::StorageError;
pub use pool::{Config, Database};
pub use state_store::SqliteStateStore;
