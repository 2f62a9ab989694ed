//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the API routes under `/api` and includes a [`TraceLayer`] that
/// logs each HTTP request/response at the `DEBUG` level using the
/// `tracing` ecosystem.
pub fn build<S, G, T, P, R>(state: AppState<S, G, T, P, R>) -> Router
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
