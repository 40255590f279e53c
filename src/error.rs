//! Error type shared by the connection middleware and the handlers.
//!
//! Every variant renders as a failed [`Envelope`]. Driver errors are logged
//! here and never echoed back to the client.

use crate::envelope::Envelope;
use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No connection could be checked out: pool exhausted or database unreachable.
    #[error("unable to acquire a database connection: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("failed to apply session settings: {0}")]
    Session(#[source] sqlx::Error),

    #[error("{message}: {source}")]
    Query {
        message: &'static str,
        status: StatusCode,
        #[source]
        source: sqlx::Error,
    },

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    BadRequest(String),

    #[error("no database connection is attached to the request")]
    MissingConnection,
}

impl ApiError {
    /// For `map_err`: wraps a driver error with the message and status the route reports.
    pub fn query(message: &'static str, status: StatusCode) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| ApiError::Query {
            message,
            status,
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Session(_) | ApiError::MissingConnection => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Query { status, .. } => *status,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn client_message(&self) -> String {
        match self {
            ApiError::Connection(_) => "Database unavailable".to_string(),
            ApiError::Session(_) => "Failed to prepare database session".to_string(),
            ApiError::Query { message, .. } => (*message).to_string(),
            ApiError::NotFound(message) => (*message).to_string(),
            ApiError::BadRequest(message) => message.clone(),
            ApiError::MissingConnection => "Internal server error".to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(format!("Invalid car id: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::BadRequest(_) | ApiError::NotFound(_) => {
                tracing::debug!(error = %self, "request rejected");
            }
            _ => tracing::error!(error = %self, "request failed"),
        }

        let body = Envelope::<()>::failure(self.client_message());
        (self.status(), Json(body)).into_response()
    }
}
