use std::{fmt, sync::Arc};

use super::extractors::{Extract, HeaderExtractor, HeaderSpec, QueryExtractor};

pub const DEFAULT_QUERY_KEY: &str = "access_token";
pub const DEFAULT_HEADER_KEY: &str = "authorization";
pub const DEFAULT_HEADER_PREFIX: &str = "Bearer ";
pub const DEFAULT_TOKEN_FIELD: &str = "token";
/// Upper bound on a buffered body when a body extractor is configured.
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

pub type SharedExtractor = Arc<dyn Extract>;

/// A labelled extractor. The label is what a conflict error reports.
#[derive(Clone)]
pub struct Source {
    label: String,
    extractor: SharedExtractor,
}

impl Source {
    pub fn new(label: impl Into<String>, extractor: impl Extract + 'static) -> Self {
        Self {
            label: label.into(),
            extractor: Arc::new(extractor),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn extractor(&self) -> &dyn Extract {
        self.extractor.as_ref()
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Source").field("label", &self.label).finish()
    }
}

/// How caller-supplied sources combine with the built-in defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceMerge {
    /// Any caller source discards every default source.
    #[default]
    Replace,
    /// Defaults stay; a caller source with the same label takes that slot,
    /// new labels are appended.
    Merge,
}

/// Caller options, merged over the defaults by [`ExtractConfig::from_options`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub from: Option<Vec<Source>>,
    pub to: Option<String>,
    pub multi_tolerant: Option<bool>,
    pub merge: SourceMerge,
    pub body_limit: Option<usize>,
}

/// Immutable extraction settings, built once and shared across requests.
///
/// Source order is precedence: with `multi_tolerant` the first matching
/// source wins.
#[derive(Debug, Clone)]
pub struct ExtractConfig {
    pub(super) sources: Vec<Source>,
    pub(super) to: String,
    pub(super) multi_tolerant: bool,
    pub(super) body_limit: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            sources: Self::default_sources(),
            to: DEFAULT_TOKEN_FIELD.to_string(),
            multi_tolerant: false,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ExtractConfig {
    /// `query` (`access_token`) then `header` (`authorization: Bearer ...`).
    fn default_sources() -> Vec<Source> {
        vec![
            Source::new("query", QueryExtractor::new(DEFAULT_QUERY_KEY)),
            Source::new(
                "header",
                HeaderExtractor::new(
                    HeaderSpec::new(DEFAULT_HEADER_KEY).with_prefix(DEFAULT_HEADER_PREFIX),
                ),
            ),
        ]
    }

    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder::default()
    }

    pub fn from_options(opts: ExtractOptions) -> Self {
        let defaults = Self::default();

        let sources = match (opts.from, opts.merge) {
            (None, _) => defaults.sources,
            (Some(from), SourceMerge::Replace) => merge_sources(Vec::new(), from),
            (Some(from), SourceMerge::Merge) => merge_sources(defaults.sources, from),
        };

        Self {
            sources,
            to: opts.to.unwrap_or(defaults.to),
            multi_tolerant: opts.multi_tolerant.unwrap_or(defaults.multi_tolerant),
            body_limit: opts.body_limit.unwrap_or(defaults.body_limit),
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.sources.iter().map(Source::label).collect()
    }

    /// Destination field name.
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn multi_tolerant(&self) -> bool {
        self.multi_tolerant
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn reads_body(&self) -> bool {
        self.sources.iter().any(|s| s.extractor.reads_body())
    }
}

// Labels are unique: a repeated label overwrites the earlier entry in place.
fn merge_sources(base: Vec<Source>, overrides: Vec<Source>) -> Vec<Source> {
    let mut merged = base;
    for source in overrides {
        match merged.iter().position(|s| s.label == source.label) {
            Some(idx) => merged[idx] = source,
            None => merged.push(source),
        }
    }
    merged
}

#[derive(Debug, Default)]
pub struct ExtractConfigBuilder {
    opts: ExtractOptions,
}

impl ExtractConfigBuilder {
    pub fn source(mut self, label: impl Into<String>, extractor: impl Extract + 'static) -> Self {
        self.opts
            .from
            .get_or_insert_with(Vec::new)
            .push(Source::new(label, extractor));
        self
    }

    pub fn to(mut self, field: impl Into<String>) -> Self {
        self.opts.to = Some(field.into());
        self
    }

    pub fn multi_tolerant(mut self, tolerant: bool) -> Self {
        self.opts.multi_tolerant = Some(tolerant);
        self
    }

    pub fn merge(mut self, merge: SourceMerge) -> Self {
        self.opts.merge = merge;
        self
    }

    pub fn body_limit(mut self, limit: usize) -> Self {
        self.opts.body_limit = Some(limit);
        self
    }

    pub fn build(self) -> ExtractConfig {
        ExtractConfig::from_options(self.opts)
    }
}
