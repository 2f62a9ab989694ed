//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use courier_domain::error::{CourierError, NotFoundError};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`CourierError`] to an HTTP response with an appropriate status.
pub struct ApiError(CourierError);

impl From<CourierError> for ApiError {
    fn from(err: CourierError) -> Self {
        Self(err)
    }
}

impl ApiError {
    /// A path id that does not parse can never name an existing resource.
    pub fn unknown_resource(entity: &'static str, id: &str) -> Self {
        Self(
            NotFoundError {
                entity,
                id: id.to_string(),
            }
            .into(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CourierError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            CourierError::AddressUnresolved(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            CourierError::NotFound(err) => (StatusCode::NOT_FOUND, err.to_string()),
            CourierError::CapacityExceeded(err) => (StatusCode::CONFLICT, err.to_string()),
            CourierError::InvalidPermutation(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            CourierError::Rule(_) | CourierError::Dispatch(_) | CourierError::Storage(_) => {
                tracing::error!(error = %self.0, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
