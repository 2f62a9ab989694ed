//! # courier-domain
//!
//! Pure domain model for the courier delivery automation suite.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error taxonomy, timestamps
//! - Define **Stops** (delivery destinations with load, priority, time window)
//! - Define the **Vehicle** (capacity and load accounting)
//! - Define **Rules** (condition/action automation pairs)
//! - Define **Snapshots** (immutable per-cycle reads of route state)
//! - Define **Events** (records of registry and automation activity)
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod rule;
pub mod snapshot;
pub mod stop;
pub mod vehicle;
