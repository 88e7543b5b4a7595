/*
 * Responsibility
 * - Errors raised by the token stages (extraction / verification)
 * - IntoResponse: HTTP status + JSON error body, returned from the middleware
 *   instead of being thrown past it
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum TokenError {
    /// More than one configured source produced a token and tolerance is off.
    /// Carries the source labels, never the token values.
    #[error("found multiple tokens in request ({})", .sources.join(", "))]
    MultipleSources { sources: Vec<String> },

    /// The verification stage found no token to verify.
    #[error("no token to verify")]
    MissingToken,

    /// Failure from the verification primitive, passed through as-is.
    #[error(transparent)]
    Verification(#[from] jsonwebtoken::errors::Error),

    #[error("failed to read request body")]
    UnreadableBody(#[source] axum::Error),
}

impl TokenError {
    pub fn status(&self) -> StatusCode {
        match self {
            TokenError::MultipleSources { .. } => StatusCode::BAD_REQUEST,
            TokenError::MissingToken | TokenError::Verification(_) => StatusCode::UNAUTHORIZED,
            TokenError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            TokenError::MultipleSources { .. } => "MULTIPLE_TOKENS",
            TokenError::MissingToken => "MISSING_TOKEN",
            TokenError::Verification(_) => "INVALID_TOKEN",
            TokenError::UnreadableBody(_) => "UNREADABLE_BODY",
        }
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
