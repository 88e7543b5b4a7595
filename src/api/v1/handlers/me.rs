/*
 * Responsibility
 * - GET|POST /me: return the payload the verification stage decoded
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::token::FieldResponse;
use crate::api::v1::extractors::Fields;
use crate::state::AppState;

pub async fn me(State(state): State<AppState>, Fields(fields): Fields) -> Json<FieldResponse> {
    let field = state.verify.to();
    Json(FieldResponse::new(field, fields.get(field)))
}
