//! # courier-adapter-http-axum
//!
//! HTTP adapter using axum. Exposes the operator mutation surface over a
//! JSON REST API: stop management, rule management, manual route
//! optimization, and monitor control.
//!
//! ## Dependency rule
//! Depends on `courier-app` (services, ports) and `courier-domain` only.
//! The composition root wires concrete adapter types into [`state::AppState`].

pub mod api;
pub mod error;
pub mod router;
pub mod state;
