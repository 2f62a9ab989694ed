//! # courier-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Own the **stop registry**, the single writer over vehicle and stop state
//! - Compute route orderings (**optimizer**) and evaluate **rules** as pure
//!   functions of a snapshot
//! - Drive the periodic **monitor** and **dispatch** triggered actions
//! - Define **port traits** that adapters must implement (driven/outbound):
//!   - `RouteStore`: load/save for stops and the vehicle
//!   - `RuleRepository`: CRUD for automation rules
//!   - `EventPublisher`: in-process event fan-out
//!   - `Geocoder`, `TravelTimeProvider`: routing collaborators
//!   - `Notifier`, `BackupStore`, `BatchExporter`: dispatch collaborators
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `courier-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod dispatcher;
pub mod event_bus;
pub mod monitor;
pub mod optimizer;
pub mod ports;
pub mod registry;
pub mod rule_engine;
pub mod services;
