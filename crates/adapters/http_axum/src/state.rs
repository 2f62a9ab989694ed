//! Shared application state for axum handlers.

use std::sync::Arc;

use courier_app::monitor::MonitorControls;
use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};
use courier_app::services::route_service::RouteService;
use courier_app::services::rule_service::RuleService;

/// Application state shared across all axum handlers.
///
/// Generic over the route store, geocoder, travel provider, event
/// publisher, and rule repository to avoid dynamic dispatch. `Clone` is
/// implemented manually so the underlying types themselves do not need to
/// be `Clone`: only the `Arc` wrappers are cloned.
pub struct AppState<S, G, T, P, R> {
    /// Route mutation and optimization service.
    pub route_service: Arc<RouteService<S, G, T, P>>,
    /// Rule CRUD service.
    pub rule_service: Arc<RuleService<R>>,
    /// Handle steering the background monitor.
    pub monitor: MonitorControls,
}

impl<S, G, T, P, R> Clone for AppState<S, G, T, P, R> {
    fn clone(&self) -> Self {
        Self {
            route_service: Arc::clone(&self.route_service),
            rule_service: Arc::clone(&self.rule_service),
            monitor: self.monitor.clone(),
        }
    }
}

impl<S, G, T, P, R> AppState<S, G, T, P, R>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    /// Create a new application state from shared service handles.
    ///
    /// Services arrive pre-wrapped in `Arc` because the monitor and
    /// dispatcher hold handles to the same instances.
    pub fn new(
        route_service: Arc<RouteService<S, G, T, P>>,
        rule_service: Arc<RuleService<R>>,
        monitor: MonitorControls,
    ) -> Self {
        Self {
            route_service,
            rule_service,
            monitor,
        }
    }
}
