//! # zoneshift-adapter-ingest-uds
//!
//! Unix domain socket ingest adapter.
//!
//! Local watcher processes connect to the daemon's socket and write one
//! JSON trigger event per line. Every line is answered on the same
//! connection: `{"ok":true,"eventId":"…"}` when the event was accepted
//! into the queue, `{"error":"…"}` when it was rejected. Rejections never
//! close the connection; a watcher may keep streaming.
//!
//! ## Dependency rule
//! Depends on `zoneshift-app` (for the engine handle) and
//! `zoneshift-domain`. Nothing in `app` or `domain` references this crate.

pub mod listener;

pub use listener::{IngestError, UdsIngest};
