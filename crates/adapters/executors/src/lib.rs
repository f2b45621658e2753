//! # zoneshift-adapter-executors
//!
//! Built-in [`ActionExecutor`](zoneshift_app::ports::ActionExecutor)
//! implementations:
//! - [`CommandExecutor`] — spawns an external program per invocation, with
//!   an optional compensating program for rollback
//! - [`LogExecutor`] — emits a structured log line; useful as a notifier
//!   and in smoke setups
//!
//! ## Dependency rule
//! Depends on `zoneshift-app` (for the executor port) and
//! `zoneshift-domain`. Nothing in `app` or `domain` references this crate.

pub mod command;
pub mod log;

pub use command::{CommandExecutor, CommandSpec};
pub use log::LogExecutor;
