/*
 * Responsibility
 * - GET|POST /token: echo what the extraction stage resolved
 */
use axum::{Json, extract::State};

use crate::api::v1::dto::token::FieldResponse;
use crate::api::v1::extractors::Fields;
use crate::state::AppState;

pub async fn show_token(
    State(state): State<AppState>,
    Fields(fields): Fields,
) -> Json<FieldResponse> {
    let field = state.extract.to();
    Json(FieldResponse::new(field, fields.get(field)))
}
