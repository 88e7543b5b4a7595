//! # token-gate
//!
//! Two axum middleware stages for bearer-style tokens:
//!
//! - **extraction** looks for a token in the query string, body and headers
//!   (or any custom source), reconciles the candidates, and writes the result
//!   to `RequestFields` under a configurable name (default `token`);
//! - **verification** reads that field, checks it with a [`TokenVerifier`]
//!   (`jsonwebtoken` by default) and writes the decoded payload (default
//!   `decoded_token`).
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{Router, routing::get};
//! use token_gate::{ExtractConfig, JwtVerifier, VerifyConfig, middleware};
//!
//! async fn me() -> &'static str { "ok" }
//!
//! let extract = Arc::new(ExtractConfig::default());
//! let verify = Arc::new(VerifyConfig::new(JwtVerifier::hs256("secret")));
//!
//! let app: Router = Router::new().route("/me", get(me));
//! let app = middleware::verify_token::apply(app, verify);
//! let app = middleware::extract_token::apply(app, extract);
//! ```
//!
//! Failures are returned as [`TokenError`], which renders as a JSON error
//! response; the wrapped handler is not called.

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod request;
pub mod services;
pub mod state;

pub use error::TokenError;
pub use request::{RequestContext, RequestFields};
pub use services::extract::{
    BodyExtractor, Extract, ExtractConfig, ExtractOptions, FieldExtractor, HeaderExtractor,
    HeaderSpec, QueryExtractor, ReadsBody, Source, SourceMerge,
};
pub use services::verify::{JwtVerifier, SecretOrKey, TokenVerifier, VerifyConfig};
