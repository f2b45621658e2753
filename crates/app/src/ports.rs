//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `app`) so that both the use-case layer
//! and the adapter layer can depend on them without creating circular
//! dependencies.

pub mod audit_store;
pub mod executor;
pub mod state_store;

pub use audit_store::AuditStore;
pub use executor::{ActionContext, ActionExecutor};
pub use state_store::StateStore;
