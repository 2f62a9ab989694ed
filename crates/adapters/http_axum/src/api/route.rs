//! JSON REST handlers for the route and vehicle.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use courier_app::optimizer::RouteOptimizationResult;
use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};
use courier_domain::error::{CourierError, NotFoundError};
use courier_domain::snapshot::RouteSnapshot;
use courier_domain::vehicle::Vehicle;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for swapping the vehicle. Either name a built-in preset
/// or describe the vehicle explicitly.
#[derive(Deserialize)]
pub struct SetVehicleRequest {
    pub preset: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub capacity: Option<f64>,
    pub fuel_efficiency: Option<f64>,
}

/// Possible responses from the route endpoint.
pub enum SnapshotResponse {
    Ok(Json<RouteSnapshot>),
}

impl IntoResponse for SnapshotResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the optimize endpoint.
pub enum OptimizeResponse {
    Ok(Json<RouteOptimizationResult>),
}

impl IntoResponse for OptimizeResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the vehicle endpoint.
pub enum VehicleResponse {
    Ok(Json<Vehicle>),
}

impl IntoResponse for VehicleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/route`: the current route snapshot.
pub async fn get_route<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
) -> Result<SnapshotResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    Ok(SnapshotResponse::Ok(Json(state.route_service.snapshot())))
}

/// `POST /api/route/optimize`: manually trigger a route optimization.
pub async fn optimize<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
) -> Result<OptimizeResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let result = state.route_service.optimize().await?;
    Ok(OptimizeResponse::Ok(Json(result)))
}

/// `PUT /api/vehicle`: swap in a different vehicle.
pub async fn set_vehicle<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Json(req): Json<SetVehicleRequest>,
) -> Result<VehicleResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let vehicle = if let Some(label) = req.preset {
        let preset = Vehicle::preset_named(&label).ok_or_else(|| {
            ApiError::from(CourierError::from(NotFoundError {
                entity: "VehiclePreset",
                id: label.clone(),
            }))
        })?;
        Vehicle::from_preset(preset)
    } else {
        Vehicle::new(
            req.make.unwrap_or_default(),
            req.model.unwrap_or_default(),
            req.capacity.unwrap_or_default(),
            req.fuel_efficiency.unwrap_or_default(),
        )
    };

    let vehicle = state.route_service.replace_vehicle(vehicle).await?;
    Ok(VehicleResponse::Ok(Json(vehicle)))
}
