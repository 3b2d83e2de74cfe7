//! Error types for the API layer.

use serde_json::json;
use storehub_db::DbError;
use thiserror::Error;

use crate::http::Response;

/// API errors and their HTTP mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input.
    #[error("{0}")]
    BadRequest(String),

    /// The addressed record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Access layer failure, including a missing database handle.
    #[error(transparent)]
    Database(#[from] DbError),

    /// A route pattern failed to compile.
    #[error("invalid path pattern: {0}")]
    InvalidPattern(String),

    /// The HTTP method is not one the router understands.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Socket failure while serving.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Returns the HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest(_) | Self::InvalidJson(_) => 400,
            Self::NotFound(_) => 404,
            Self::UnsupportedMethod(_) => 405,
            Self::Database(_) | Self::InvalidPattern(_) | Self::Io(_) => 500,
        }
    }

    /// Converts the error into a JSON response.
    ///
    /// Server errors are reported as `"Internal server error"`; with
    /// `details` set the underlying message is included as well.
    #[must_use]
    pub fn to_response(&self, details: bool) -> Response {
        let status = self.status();
        if status < 500 {
            return Response::error(status, &self.to_string());
        }

        tracing::error!(error = %self, "Request failed");
        let body = if details {
            json!({ "error": "Internal server error", "details": self.to_string() })
        } else {
            json!({ "error": "Internal server error" })
        };
        Response::json(&body).status(status)
    }
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
