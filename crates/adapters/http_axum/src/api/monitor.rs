//! JSON REST handlers for monitor control.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use courier_app::monitor::MonitorState;
use courier_app::ports::{
    EventPublisher, Geocoder, RouteStore, RuleRepository, TravelTimeProvider,
};
use courier_domain::error::{CourierError, ValidationError};

use crate::error::ApiError;
use crate::state::AppState;

/// Monitor status payload.
#[derive(Serialize)]
pub struct MonitorStatus {
    pub state: MonitorState,
    pub interval_seconds: u64,
}

/// Request body for changing the tick interval.
#[derive(Deserialize)]
pub struct SetIntervalRequest {
    pub seconds: u64,
}

/// Possible responses from the status endpoint.
pub enum StatusResponse {
    Ok(Json<MonitorStatus>),
}

impl IntoResponse for StatusResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/monitor`: monitor state and interval.
pub async fn get_status<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
) -> Result<StatusResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    Ok(StatusResponse::Ok(Json(MonitorStatus {
        state: state.monitor.state(),
        interval_seconds: state.monitor.interval().as_secs(),
    })))
}

/// `PUT /api/monitor/interval`: change the tick interval.
pub async fn set_interval<S, G, T, P, R>(
    State(state): State<AppState<S, G, T, P, R>>,
    Json(req): Json<SetIntervalRequest>,
) -> Result<StatusResponse, ApiError>
where
    S: RouteStore + Send + Sync + 'static,
    G: Geocoder + Send + Sync + 'static,
    T: TravelTimeProvider + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    R: RuleRepository + Send + Sync + 'static,
{
    if req.seconds == 0 {
        return Err(ApiError::from(CourierError::Validation(
            ValidationError::ZeroInterval,
        )));
    }
    state.monitor.set_interval(Duration::from_secs(req.seconds));
    Ok(StatusResponse::Ok(Json(MonitorStatus {
        state: state.monitor.state(),
        interval_seconds: state.monitor.interval().as_secs(),
    })))
}
