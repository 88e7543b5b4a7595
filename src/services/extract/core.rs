//! Token reconciliation: many candidate sources in, at most one token out.
//!
//! This is "core-only": it knows nothing about axum. The middleware adapter
//! builds a `RequestContext`, calls `apply`, and hands the request on.

use serde_json::Value;
use tracing::{debug, warn};

use super::config::ExtractConfig;
use crate::error::TokenError;
use crate::request::RequestContext;

impl ExtractConfig {
    /// Runs every source in order and reconciles the non-empty results.
    ///
    /// - none: `Ok(None)`
    /// - one: `Ok(Some(token))`
    /// - several, tolerant: the earliest configured source wins
    /// - several, not tolerant: `MultipleSources` with the matching labels
    pub fn resolve(&self, req: &RequestContext) -> Result<Option<String>, TokenError> {
        let found: Vec<(&str, String)> = self
            .sources
            .iter()
            .filter_map(|source| {
                source
                    .extractor()
                    .extract(req)
                    .filter(|token| !token.is_empty())
                    .map(|token| (source.label(), token))
            })
            .collect();

        if !self.multi_tolerant && found.len() > 1 {
            // Labels only: token values must never reach logs or error bodies.
            let sources: Vec<String> = found.iter().map(|(label, _)| label.to_string()).collect();
            warn!(sources = ?sources, "token found in multiple sources");
            return Err(TokenError::MultipleSources { sources });
        }

        Ok(found.into_iter().next().map(|(label, token)| {
            debug!(source = label, field = %self.to, "token resolved");
            token
        }))
    }

    /// Resolves the token and writes it (or explicit null) to the destination field.
    ///
    /// On error the destination field is left untouched.
    pub fn apply(&self, req: &mut RequestContext) -> Result<(), TokenError> {
        let token = self.resolve(req)?;
        req.fields
            .set(self.to.clone(), token.map_or(Value::Null, Value::String));
        Ok(())
    }
}
