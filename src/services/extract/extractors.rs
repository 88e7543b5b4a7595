//! Token extractors: one per request location.
//!
//! Every extractor is a pure function of the request. A missing location,
//! missing key or value of the wrong shape yields `None`; none of them fail.

use std::fmt;

use crate::request::{FieldMap, RequestContext};

/// Pulls a candidate token out of one location of a request.
pub trait Extract: Send + Sync {
    fn extract(&self, req: &RequestContext) -> Option<String>;

    /// Whether this extractor needs the request body parsed into fields.
    fn reads_body(&self) -> bool {
        false
    }
}

/// Closures are extractors too. They never ask for the body, so `req.body` is
/// always `None` for them; wrap one in [`ReadsBody`] to have the body parsed.
impl<F> Extract for F
where
    F: Fn(&RequestContext) -> Option<String> + Send + Sync,
{
    fn extract(&self, req: &RequestContext) -> Option<String> {
        self(req)
    }
}

/// Marks an extractor as needing the parsed body.
///
/// ```ignore
/// let source = ReadsBody(|req: &RequestContext| {
///     req.body.as_ref()?.get("nested")?.get("token")?.as_str().map(str::to_owned)
/// });
/// ```
#[derive(Debug, Clone)]
pub struct ReadsBody<E>(pub E);

impl<E: Extract> Extract for ReadsBody<E> {
    fn extract(&self, req: &RequestContext) -> Option<String> {
        self.0.extract(req)
    }

    fn reads_body(&self) -> bool {
        true
    }
}

fn string_at(map: Option<&FieldMap>, key: &str) -> Option<String> {
    map?.get(key)?.as_str().map(str::to_owned)
}

/// Reads `query[key]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryExtractor {
    key: String,
}

impl QueryExtractor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Extract for QueryExtractor {
    fn extract(&self, req: &RequestContext) -> Option<String> {
        string_at(req.query.as_ref(), &self.key)
    }
}

/// Reads `body[key]` from a JSON object or urlencoded form body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyExtractor {
    key: String,
}

impl BodyExtractor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Extract for BodyExtractor {
    fn extract(&self, req: &RequestContext) -> Option<String> {
        string_at(req.body.as_ref(), &self.key)
    }

    fn reads_body(&self) -> bool {
        true
    }
}

/// Header location: name plus an optional required prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSpec {
    pub key: String,
    pub prefix: Option<String>,
}

impl HeaderSpec {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            prefix: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// Reads a header, stripping the configured prefix.
///
/// With a non-empty prefix, a value that does not start with exactly that
/// prefix is not a candidate. Header names are matched case-insensitively, as
/// `http::HeaderMap` stores them.
#[derive(Clone, PartialEq, Eq)]
pub struct HeaderExtractor {
    spec: HeaderSpec,
}

impl HeaderExtractor {
    pub fn new(spec: HeaderSpec) -> Self {
        Self { spec }
    }
}

impl fmt::Debug for HeaderExtractor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeaderExtractor")
            .field("key", &self.spec.key)
            .field("prefix", &self.spec.prefix)
            .finish()
    }
}

impl Extract for HeaderExtractor {
    fn extract(&self, req: &RequestContext) -> Option<String> {
        // Non-visible-ASCII values fail `to_str` and count as "not a string".
        let value = req
            .headers
            .as_ref()?
            .get(self.spec.key.as_str())?
            .to_str()
            .ok()?;

        match self.spec.prefix.as_deref().filter(|p| !p.is_empty()) {
            Some(prefix) => value.strip_prefix(prefix).map(str::to_owned),
            None => Some(value.to_owned()),
        }
    }
}

/// Reads a string previously written to `RequestFields` by an earlier stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldExtractor {
    key: String,
}

impl FieldExtractor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Extract for FieldExtractor {
    fn extract(&self, req: &RequestContext) -> Option<String> {
        req.fields.token(&self.key).map(str::to_owned)
    }
}
