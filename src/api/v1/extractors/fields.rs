use axum::extract::FromRequestParts;
use axum::http::{StatusCode, request::Parts};

use crate::request::RequestFields;

/// Hands handlers the `RequestFields` written by the token stages.
///
/// Rejects with 500 when the route was mounted without the token stages.
pub struct Fields(pub RequestFields);

impl<S> FromRequestParts<S> for Fields
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestFields>()
            .cloned()
            .map(Fields)
            .ok_or_else(|| {
                tracing::error!("RequestFields missing; is the token middleware applied?");
                StatusCode::INTERNAL_SERVER_ERROR
            })
    }
}
