//! JSON REST handlers for delivery stops.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};
use courier_domain::id::StopId;
use courier_domain::stop::{Coordinates, Priority, Stop, TimeWindow};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for adding a stop.
#[derive(Deserialize)]
pub struct CreateStopRequest {
    pub address: String,
    pub load: f64,
    pub priority: Option<Priority>,
    pub window: Option<TimeWindow>,
    pub coordinates: Option<Coordinates>,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Stop>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Stop>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from endpoints returning a single stop.
pub enum StopResponse {
    Ok(Json<Stop>),
}

impl IntoResponse for StopResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_id(id: &str) -> Result<StopId, ApiError> {
    StopId::from_str(id).map_err(|_| ApiError::unknown_resource("Stop", id))
}

/// `GET /api/stops`: list all stops in route order.
pub async fn list<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
) -> Result<ListResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let snapshot = state.route_service.snapshot();
    Ok(ListResponse::Ok(Json(snapshot.stops)))
}

/// `POST /api/stops`: add a stop to the route.
pub async fn create<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Json(req): Json<CreateStopRequest>,
) -> Result<CreateResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let mut builder = Stop::builder().address(req.address).load(req.load);
    if let Some(priority) = req.priority {
        builder = builder.priority(priority);
    }
    if let Some(window) = req.window {
        builder = builder.window(window);
    }
    if let Some(coordinates) = req.coordinates {
        builder = builder.coordinates(coordinates);
    }
    let stop = builder.build()?;

    let created = state.route_service.add_stop(stop).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `DELETE /api/stops/{id}`: remove a stop.
pub async fn delete<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    state.route_service.remove_stop(id).await?;
    Ok(DeleteResponse::NoContent)
}

/// `POST /api/stops/{id}/start`: mark a stop en route.
pub async fn start<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<StopResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let stop = state.route_service.start_stop(id).await?;
    Ok(StopResponse::Ok(Json(stop)))
}

/// `POST /api/stops/{id}/complete`: mark a stop delivered.
pub async fn complete<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<StopResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let stop = state.route_service.complete_stop(id).await?;
    Ok(StopResponse::Ok(Json(stop)))
}

/// `POST /api/stops/{id}/undo`: undo a completion.
pub async fn undo<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<StopResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let stop = state.route_service.undo_complete(id).await?;
    Ok(StopResponse::Ok(Json(stop)))
}

/// `POST /api/stops/{id}/skip`: skip a stop.
pub async fn skip<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Path(id): Path<String>,
) -> Result<StopResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    let id = parse_id(&id)?;
    let stop = state.route_service.skip_stop(id).await?;
    Ok(StopResponse::Ok(Json(stop)))
}
