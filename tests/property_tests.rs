//! Property tests for token reconciliation.
//!
//! Each case builds a request where an arbitrary subset of the configured
//! sources carries a token and checks the resolved field against the
//! configuration order.

use axum::http::{HeaderValue, header};
use proptest::prelude::*;
use serde_json::Value;
use token_gate::{
    BodyExtractor, Extract, ExtractConfig, HeaderExtractor, HeaderSpec, QueryExtractor,
    RequestContext, TokenError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Loc {
    Query,
    Body,
    Header,
}

impl Loc {
    fn label(self) -> &'static str {
        match self {
            Loc::Query => "query",
            Loc::Body => "body",
            Loc::Header => "header",
        }
    }
}

// Strategy: a permutation of the three locations (configuration order)
fn arb_order() -> impl Strategy<Value = Vec<Loc>> {
    Just(vec![Loc::Query, Loc::Body, Loc::Header]).prop_shuffle()
}

// Strategy: visible-ASCII token, no spaces, never empty
fn arb_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9._~+/-]{1,40}").unwrap()
}

fn config_for(order: &[Loc], tolerant: bool) -> ExtractConfig {
    order
        .iter()
        .fold(ExtractConfig::builder(), |builder, loc| match loc {
            Loc::Query => builder.source(loc.label(), QueryExtractor::new("access_token")),
            Loc::Body => builder.source(loc.label(), BodyExtractor::new("access_token")),
            Loc::Header => builder.source(
                loc.label(),
                HeaderExtractor::new(HeaderSpec::new("authorization").with_prefix("Bearer ")),
            ),
        })
        .multi_tolerant(tolerant)
        .build()
}

fn request_with(tokens: &[(Loc, Option<String>)]) -> RequestContext {
    tokens
        .iter()
        .fold(RequestContext::new(), |req, (loc, token)| match (loc, token) {
            (_, None) => req,
            (Loc::Query, Some(t)) => req.with_query_param("access_token", t.as_str()),
            (Loc::Body, Some(t)) => req.with_body_field("access_token", t.as_str()),
            (Loc::Header, Some(t)) => req.with_header(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {t}")).unwrap(),
            ),
        })
}

proptest! {
    /// Property: zero, one or many matches resolve exactly as the precedence
    /// and tolerance rules say, and an error never writes the field.
    #[test]
    fn proptest_resolution_follows_configuration_order(
        order in arb_order(),
        query in prop::option::of(arb_token()),
        body in prop::option::of(arb_token()),
        header_token in prop::option::of(arb_token()),
        tolerant in any::<bool>(),
    ) {
        let tokens = vec![
            (Loc::Query, query),
            (Loc::Body, body),
            (Loc::Header, header_token),
        ];
        let token_at = |loc: Loc| tokens.iter().find(|(l, _)| *l == loc).and_then(|(_, t)| t.clone());

        // Matches in configuration order, not request order.
        let matched: Vec<(Loc, String)> = order
            .iter()
            .filter_map(|loc| token_at(*loc).map(|t| (*loc, t)))
            .collect();

        let config = config_for(&order, tolerant);
        let mut req = request_with(&tokens);
        let result = config.apply(&mut req);

        match matched.len() {
            0 => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(req.fields.get("token"), Some(&Value::Null));
            }
            1 => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(req.fields.token("token"), Some(matched[0].1.as_str()));
            }
            _ if tolerant => {
                prop_assert!(result.is_ok());
                prop_assert_eq!(req.fields.token("token"), Some(matched[0].1.as_str()));
            }
            _ => {
                let expected: Vec<String> =
                    matched.iter().map(|(loc, _)| loc.label().to_string()).collect();
                match result {
                    Err(TokenError::MultipleSources { sources }) => {
                        prop_assert_eq!(sources, expected);
                    }
                    other => prop_assert!(false, "expected MultipleSources, got {:?}", other),
                }
                prop_assert!(!req.fields.contains("token"));
            }
        }
    }

    /// Property: header extraction is prefix-exact and returns the suffix.
    #[test]
    fn proptest_header_prefix_is_exact(
        prefix in prop::string::string_regex("[A-Za-z]{1,8} ").unwrap(),
        other in prop::string::string_regex("[A-Za-z]{1,8} ").unwrap(),
        token in arb_token(),
    ) {
        let extractor = HeaderExtractor::new(HeaderSpec::new("authorization").with_prefix(prefix.as_str()));

        let matching = RequestContext::new().with_header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("{prefix}{token}")).unwrap(),
        );
        prop_assert_eq!(extractor.extract(&matching), Some(token.clone()));
        // Idempotent.
        prop_assert_eq!(extractor.extract(&matching), extractor.extract(&matching));

        let value = format!("{other}{token}");
        let foreign = RequestContext::new().with_header(
            header::AUTHORIZATION,
            HeaderValue::from_str(&value).unwrap(),
        );
        let expected = value.strip_prefix(prefix.as_str()).map(str::to_owned);
        prop_assert_eq!(extractor.extract(&foreign), expected);
    }

    /// Property: an empty value in any source is never a candidate.
    #[test]
    fn proptest_empty_values_are_ignored(order in arb_order(), token in arb_token()) {
        let config = config_for(&order, false);
        let mut req = RequestContext::new()
            .with_query_param("access_token", "")
            .with_body_field("access_token", token.as_str())
            .with_header(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));

        prop_assert!(config.apply(&mut req).is_ok());
        prop_assert_eq!(req.fields.token("token"), Some(token.as_str()));
    }
}
