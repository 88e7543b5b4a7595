//! Token verification stage: verify the extracted token, attach the payload.
//!
//! Must run after `extract_token` when reading the default `token` field.
//! With axum layers that means applying this stage first:
//! ```ignore
//! let api = middleware::verify_token::apply(api, verify.clone());
//! let api = middleware::extract_token::apply(api, extract.clone());
//! ```

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
use crate::services::verify::VerifyConfig;

pub fn apply<S>(router: Router<S>, config: Arc<VerifyConfig>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(config, verify_token_middleware))
}

pub async fn verify_token_middleware(
    State(config): State<Arc<VerifyConfig>>,
    req: Request,
    next: Next,
) -> Result<Response, TokenError> {
    let (mut parts, body) = req.into_parts();

    let (body_fields, body) = if config.reads_body() {
        buffer_fields(&mut parts, body, config.body_limit()).await?
    } else {
        (None, body)
    };

    let mut ctx = RequestContext::take_from(&mut parts, body_fields);
    let outcome = config.verify(&mut ctx).await;
    ctx.restore_into(&mut parts);
    outcome?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
