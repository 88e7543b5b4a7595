pub mod config;
pub mod core;
pub mod extractors;

pub use config::{
    DEFAULT_BODY_LIMIT, DEFAULT_HEADER_KEY, DEFAULT_HEADER_PREFIX, DEFAULT_QUERY_KEY,
    DEFAULT_TOKEN_FIELD, ExtractConfig, ExtractConfigBuilder, ExtractOptions, SharedExtractor,
    Source, SourceMerge,
};
pub use extractors::{
    BodyExtractor, Extract, FieldExtractor, HeaderExtractor, HeaderSpec, QueryExtractor,
    ReadsBody,
};
