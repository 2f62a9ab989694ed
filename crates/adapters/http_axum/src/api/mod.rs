//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod monitor;
#[allow(clippy::missing_errors_doc)]
pub mod route;
#[allow(clippy::missing_errors_doc)]
pub mod rules;
#[allow(clippy::missing_errors_doc)]
pub mod stops;

use axum::Router;
use axum::routing::{get, post, put};

use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, G, T, P, R>() -> Router<AppState<S, G, T, P, R>>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    Router::new()
        // Stops
        .route(
            "/stops",
            get(stops::list::<S, G, T, P, R>).post(stops::create::<S, G, T, P, R>),
        )
        .route("/stops/{id}", axum::routing::delete(stops::delete::<S, G, T, P, R>))
        .route("/stops/{id}/start", post(stops::start::<S, G, T, P, R>))
        .route(
            "/stops/{id}/complete",
            post(stops::complete::<S, G, T, P, R>),
        )
        .route("/stops/{id}/undo", post(stops::undo::<S, G, T, P, R>))
        .route("/stops/{id}/skip", post(stops::skip::<S, G, T, P, R>))
        // Route
        .route("/route", get(route::get_route::<S, G, T, P, R>))
        .route("/route/optimize", post(route::optimize::<S, G, T, P, R>))
        .route("/vehicle", put(route::set_vehicle::<S, G, T, P, R>))
        // Rules
        .route(
            "/rules",
            get(rules::list::<S, G, T, P, R>).post(rules::create::<S, G, T, P, R>),
        )
        .route(
            "/rules/{id}",
            get(rules::get::<S, G, T, P, R>)
                .put(rules::update::<S, G, T, P, R>)
                .delete(rules::delete::<S, G, T, P, R>),
        )
        .route(
            "/rules/{id}/enabled",
            put(rules::set_enabled::<S, G, T, P, R>),
        )
        // Monitor
        .route("/monitor", get(monitor::get_status::<S, G, T, P, R>))
        .route(
            "/monitor/interval",
            put(monitor::set_interval::<S, G, T, P, R>),
        )
}
