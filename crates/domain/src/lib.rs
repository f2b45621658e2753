//! # zoneshift-domain
//!
//! Pure domain model for the zoneshift privacy-zone policy engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Zones** (named security postures; exactly one is active)
//! - Define **Trigger Events** (externally classified occurrences fed into
//!   the engine: device insertion, URL navigation, process activity)
//! - Define **Rules** (declarative zone transitions with condition
//!   predicates, ordered action lists, priority, and cooldown)
//! - Define **Rule Sets** (the versioned document holding zones and rules,
//!   validated as a whole before it is ever consulted)
//! - Define **Audit records** (transition and action-invocation entries)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod audit;
pub mod event;
pub mod rule;
pub mod zone;
