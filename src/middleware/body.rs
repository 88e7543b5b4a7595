use axum::{
    body::Body,
    http::{header, request::Parts},
};

use crate::error::TokenError;
use crate::request::{FieldMap, parse_body};

/// Body fields parsed by an earlier stage, kept in request extensions.
#[derive(Debug, Clone)]
struct ParsedBody {
    len: usize,
    fields: Option<FieldMap>,
}

/// Buffers the body (up to `limit` bytes) and parses it into fields.
///
/// Returns a fresh `Body` holding the same bytes so downstream handlers can
/// still read it. A later stage on the same request reuses the parsed fields
/// instead of buffering again; `limit` still applies to the original length.
pub(crate) async fn buffer_fields(
    parts: &mut Parts,
    body: Body,
    limit: usize,
) -> Result<(Option<FieldMap>, Body), TokenError> {
    if let Some(parsed) = parts.extensions.get::<ParsedBody>() {
        if parsed.len > limit {
            tracing::warn!(len = parsed.len, limit, "buffered request body over limit");
            return Err(TokenError::UnreadableBody(axum::Error::new(
                "length limit exceeded",
            )));
        }
        return Ok((parsed.fields.clone(), body));
    }

    let bytes = axum::body::to_bytes(body, limit).await.map_err(|err| {
        tracing::warn!(error = %err, limit, "failed to buffer request body");
        TokenError::UnreadableBody(err)
    })?;

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let fields = parse_body(content_type, &bytes);

    parts.extensions.insert(ParsedBody {
        len: bytes.len(),
        fields: fields.clone(),
    });

    Ok((fields, Body::from(bytes)))
}
