use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use investor_tracker_core::errors::CoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Uniform body of every relay response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub success: bool,
    pub message: String,
}

impl RelayResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RelayError {
    /// The request itself is unusable: bad JSON, missing fields, bad address.
    #[error("{0}")]
    BadRequest(String),

    /// No email kind is served at the requested path.
    #[error("{0}")]
    UnknownRoute(String),

    /// Delivery failed downstream. Not retried.
    #[error("{0}")]
    Delivery(String),
}

impl From<CoreError> for RelayError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::MissingFields(_) | CoreError::ValidationError(_) => {
                RelayError::BadRequest(e.to_string())
            }
            other => RelayError::Delivery(other.to_string()),
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match self {
            RelayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::UnknownRoute(_) => StatusCode::NOT_FOUND,
            RelayError::Delivery(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(RelayResponse::failure(self.to_string()))).into_response()
    }
}

pub type RelayResult<T> = Result<T, RelayError>;
