//! The request view the token stages read from and write into.
//!
//! Built by the axum adapters from `http::request::Parts`: headers and
//! `RequestFields` are moved out of the parts for the duration of a stage and
//! moved back afterwards, so the host's request is never replaced.

use axum::http::{HeaderMap, HeaderName, HeaderValue, request::Parts};
use serde_json::Value;
use url::form_urlencoded;

use super::RequestFields;

/// String-keyed values from the query string or a parsed body.
pub type FieldMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub query: Option<FieldMap>,
    pub body: Option<FieldMap>,
    pub headers: Option<HeaderMap>,
    pub fields: RequestFields,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body
            .get_or_insert_with(FieldMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }

    pub fn with_fields(mut self, fields: RequestFields) -> Self {
        self.fields = fields;
        self
    }

    /// Moves headers and `RequestFields` out of `parts`.
    ///
    /// Must be paired with [`RequestContext::restore_into`] on the same parts.
    pub fn take_from(parts: &mut Parts, body: Option<FieldMap>) -> Self {
        let query = parts.uri.query().map(parse_query);
        let headers = std::mem::take(&mut parts.headers);
        let fields = parts
            .extensions
            .remove::<RequestFields>()
            .unwrap_or_default();

        Self {
            query,
            body,
            headers: Some(headers),
            fields,
        }
    }

    /// Puts headers and fields back onto the request they were taken from.
    pub fn restore_into(self, parts: &mut Parts) {
        if let Some(headers) = self.headers {
            parts.headers = headers;
        }
        parts.extensions.insert(self.fields);
    }
}

/// Parses an `application/x-www-form-urlencoded` string.
///
/// A key that appears more than once collects its values into an array, in
/// order of appearance.
pub fn parse_query(query: &str) -> FieldMap {
    parse_pairs(query.as_bytes())
}

fn parse_pairs(input: &[u8]) -> FieldMap {
    let mut map = FieldMap::new();
    for (key, value) in form_urlencoded::parse(input) {
        let value = Value::String(value.into_owned());
        match map.get_mut(&*key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key.into_owned(), value);
            }
        }
    }
    map
}

/// Parses a buffered body into fields.
///
/// JSON objects and urlencoded forms produce fields; anything else (empty
/// body, other content types, JSON that is not an object) yields `None`.
pub fn parse_body(content_type: Option<&str>, bytes: &[u8]) -> Option<FieldMap> {
    if bytes.is_empty() {
        return None;
    }

    let mime = content_type?.split(';').next()?.trim().to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    } else if mime == "application/x-www-form-urlencoded" {
        Some(parse_pairs(bytes))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, header};
    use serde_json::json;

    #[test]
    fn parse_query_decodes_pairs() {
        let query = parse_query("access_token=abc%20def&x=1");
        assert_eq!(query.get("access_token"), Some(&json!("abc def")));
        assert_eq!(query.get("x"), Some(&json!("1")));
    }

    #[test]
    fn parse_query_collects_repeated_keys() {
        let query = parse_query("t=a&t=b&t=c");
        assert_eq!(query.get("t"), Some(&json!(["a", "b", "c"])));
    }

    #[test]
    fn parse_body_accepts_json_objects_only() {
        let ct = Some("application/json; charset=utf-8");
        assert_eq!(
            parse_body(ct, br#"{"foo":"bar"}"#).and_then(|m| m.get("foo").cloned()),
            Some(json!("bar"))
        );
        assert!(parse_body(ct, br#"["foo"]"#).is_none());
        assert!(parse_body(ct, b"not json").is_none());
        assert!(parse_body(ct, b"").is_none());
    }

    #[test]
    fn parse_body_accepts_forms() {
        let body = parse_body(Some("application/x-www-form-urlencoded"), b"foo=bar").unwrap();
        assert_eq!(body.get("foo"), Some(&json!("bar")));
    }

    #[test]
    fn parse_body_ignores_other_content_types() {
        assert!(parse_body(Some("text/plain"), b"foo=bar").is_none());
        assert!(parse_body(None, br#"{"foo":"bar"}"#).is_none());
    }

    #[test]
    fn take_and_restore_round_trips_parts() {
        let (mut parts, _) = Request::builder()
            .uri("/x?access_token=abc")
            .header(header::AUTHORIZATION, "Bearer abc")
            .body(())
            .unwrap()
            .into_parts();

        let mut ctx = RequestContext::take_from(&mut parts, None);
        assert!(parts.headers.is_empty());
        assert_eq!(
            ctx.query.as_ref().and_then(|q| q.get("access_token")),
            Some(&json!("abc"))
        );

        ctx.fields.set("token", json!("abc"));
        ctx.restore_into(&mut parts);

        assert_eq!(parts.headers[header::AUTHORIZATION], "Bearer abc");
        let fields = parts.extensions.get::<RequestFields>().unwrap();
        assert_eq!(fields.token("token"), Some("abc"));
    }

    #[test]
    fn uri_without_query_has_no_query_map() {
        let (mut parts, _) = Request::builder().uri("/x").body(()).unwrap().into_parts();
        let ctx = RequestContext::take_from(&mut parts, None);
        assert!(ctx.query.is_none());
    }
}
