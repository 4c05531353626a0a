use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use thiserror::Error;
use tracing::error;

use crate::schemas::ErrorResponse;

pub const USER_NOT_FOUND: &str = "User not found";
pub const MOVIE_NOT_FOUND: &str = "Movie not found";
pub const EVENT_NOT_FOUND: &str = "Event not found";
pub const INVALID_BODY: &str = "Invalid request body";

/// Failures a request handler can report.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A referenced identifier does not exist
    #[error("{0}")]
    NotFound(&'static str),

    /// A required field is missing or unusable
    #[error("{0}")]
    InvalidBody(String),

    /// The store rejected the operation
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl ApiError {
    pub fn invalid_body() -> Self {
        Self::InvalidBody(INVALID_BODY.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Database(db_error) => {
                error!("Database error while handling request: {}", db_error);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
