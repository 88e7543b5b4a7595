//! Token extraction stage: find the token, write it to `RequestFields`.
//!
//! Conflicts come back as `TokenError` (rendered as a 400 response); the
//! handler is not called in that case.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};

use super::body::buffer_fields;
use crate::error::TokenError;
use crate::request::RequestContext;
use crate::services::extract::ExtractConfig;

/// Installs the extraction stage on every route currently in `router`.
///
/// ```ignore
/// let api = Router::new().route("/me", get(me));
/// let api = middleware::extract_token::apply(api, Arc::new(ExtractConfig::default()));
/// ```
pub fn apply<S>(router: Router<S>, config: Arc<ExtractConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(config, extract_token_middleware))
}

pub async fn extract_token_middleware(
    State(config): State<Arc<ExtractConfig>>,
    req: Request,
    next: Next,
) -> Result<Response, TokenError> {
    let (mut parts, body) = req.into_parts();

    // Only pay for buffering when some source reads the body.
    let (body_fields, body) = if config.reads_body() {
        buffer_fields(&mut parts, body, config.body_limit()).await?
    } else {
        (None, body)
    };

    let mut ctx = RequestContext::take_from(&mut parts, body_fields);
    let outcome = config.apply(&mut ctx);
    ctx.restore_into(&mut parts);
    outcome?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
