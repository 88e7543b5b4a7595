/*
 * Responsibility
 * - v1 URL structure
 * - Which routes get which token stages
 *   - /token: extraction only
 *   - /me: extraction, then verification
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{me::me, token::show_token};
use crate::middleware::{extract_token, verify_token};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let extracted = Router::new().route("/token", get(show_token).post(show_token));
    let extracted = extract_token::apply(extracted, state.extract.clone());

    // Layers run outermost-first: extraction must be applied last.
    let verified = Router::new().route("/me", get(me).post(me));
    let verified = verify_token::apply(verified, state.verify.clone());
    let verified = extract_token::apply(verified, state.extract.clone());

    Router::new().merge(extracted).merge(verified)
}
