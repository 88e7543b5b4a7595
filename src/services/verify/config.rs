use std::{fmt, sync::Arc};

use jsonwebtoken::Validation;
use tracing::{debug, warn};

use super::verifier::{JwtVerifier, SecretOrKey, TokenVerifier};
use crate::error::TokenError;
use crate::request::RequestContext;
use crate::services::extract::{
    DEFAULT_BODY_LIMIT, DEFAULT_TOKEN_FIELD, Extract, FieldExtractor, SharedExtractor,
};

pub const DEFAULT_DECODED_FIELD: &str = "decoded_token";

/// Verification stage settings: where the token comes from, who checks it,
/// and where the decoded payload goes.
#[derive(Clone)]
pub struct VerifyConfig {
    verifier: Arc<dyn TokenVerifier>,
    from: SharedExtractor,
    to: String,
    body_limit: usize,
}

impl fmt::Debug for VerifyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifyConfig")
            .field("to", &self.to)
            .field("body_limit", &self.body_limit)
            .finish_non_exhaustive()
    }
}

impl VerifyConfig {
    /// Reads `fields["token"]`, writes `fields["decoded_token"]`.
    pub fn new(verifier: impl TokenVerifier + 'static) -> Self {
        Self {
            verifier: Arc::new(verifier),
            from: Arc::new(FieldExtractor::new(DEFAULT_TOKEN_FIELD)),
            to: DEFAULT_DECODED_FIELD.to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Stock `jsonwebtoken` verifier for `secret_or_key` with `validation`.
    pub fn with_secret_or_key(
        secret_or_key: &SecretOrKey,
        validation: Validation,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::new(JwtVerifier::new(secret_or_key, validation)?))
    }

    pub fn read_from(mut self, extractor: impl Extract + 'static) -> Self {
        self.from = Arc::new(extractor);
        self
    }

    pub fn write_to(mut self, field: impl Into<String>) -> Self {
        self.to = field.into();
        self
    }

    /// Maximum body size buffered when `from` reads the body.
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    /// Destination field name.
    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    pub fn reads_body(&self) -> bool {
        self.from.reads_body()
    }

    /// Verifies the token found by `from` and writes the payload to `to`.
    ///
    /// Verifier failures are returned unchanged inside `TokenError::Verification`.
    pub async fn verify(&self, req: &mut RequestContext) -> Result<(), TokenError> {
        let token = self
            .from
            .extract(req)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                debug!("no token to verify");
                TokenError::MissingToken
            })?;

        let decoded = self.verifier.verify(&token).await.map_err(|err| {
            warn!(error = ?err, "token verification failed");
            TokenError::Verification(err)
        })?;

        req.fields.set(self.to.clone(), decoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestFields;
    use async_trait::async_trait;
    use jsonwebtoken::{EncodingKey, Header, errors::ErrorKind};
    use serde_json::{Value, json};

    fn signed(claims: &Value) -> String {
        jsonwebtoken::encode(&Header::default(), claims, &EncodingKey::from_secret(b"bar"))
            .unwrap()
    }

    fn with_field(key: &str, value: Value) -> RequestContext {
        let mut fields = RequestFields::new();
        fields.set(key, value);
        RequestContext::new().with_fields(fields)
    }

    #[tokio::test]
    async fn decodes_token_field_into_decoded_field() {
        let claims = json!({ "sub": "bar" });
        let mut req = with_field("token", json!(signed(&claims)));

        VerifyConfig::new(JwtVerifier::hs256("bar"))
            .verify(&mut req)
            .await
            .unwrap();

        assert_eq!(req.fields.get("decoded_token"), Some(&claims));
        // The raw token stays where extraction left it.
        assert!(req.fields.token("token").is_some());
    }

    #[tokio::test]
    async fn custom_from_and_to() {
        let claims = json!({ "sub": "bar" });
        let mut req = with_field("tok", json!(signed(&claims)));

        VerifyConfig::new(JwtVerifier::hs256("bar"))
            .read_from(FieldExtractor::new("tok"))
            .write_to("dec_tok")
            .verify(&mut req)
            .await
            .unwrap();

        assert_eq!(req.fields.get("dec_tok"), Some(&claims));
    }

    #[tokio::test]
    async fn null_token_is_missing() {
        let mut req = with_field("token", Value::Null);

        let err = VerifyConfig::new(JwtVerifier::hs256("bar"))
            .verify(&mut req)
            .await
            .unwrap_err();

        assert!(matches!(err, TokenError::MissingToken));
        assert!(!req.fields.contains("decoded_token"));
    }

    #[tokio::test]
    async fn bad_signature_passes_through() {
        let mut req = with_field("token", json!(signed(&json!({ "sub": "bar" }))));

        let err = VerifyConfig::new(JwtVerifier::hs256("wrong"))
            .verify(&mut req)
            .await
            .unwrap_err();

        match err {
            TokenError::Verification(e) => assert!(matches!(e.kind(), ErrorKind::InvalidSignature)),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!req.fields.contains("decoded_token"));
    }

    struct Echo;

    #[async_trait]
    impl TokenVerifier for Echo {
        async fn verify(&self, token: &str) -> Result<Value, jsonwebtoken::errors::Error> {
            Ok(json!({ "raw": token }))
        }
    }

    #[tokio::test]
    async fn any_verifier_can_be_plugged_in() {
        let mut req = with_field("token", json!("opaque"));

        VerifyConfig::new(Echo).verify(&mut req).await.unwrap();

        assert_eq!(req.fields.get("decoded_token"), Some(&json!({ "raw": "opaque" })));
    }

    #[test]
    fn builds_from_secret_or_key() {
        let config = VerifyConfig::with_secret_or_key(
            &SecretOrKey::secret("bar"),
            JwtVerifier::default_validation(jsonwebtoken::Algorithm::HS256),
        )
        .unwrap();
        assert_eq!(config.to(), DEFAULT_DECODED_FIELD);
        assert!(!config.reads_body());
        assert_eq!(config.body_limit(), DEFAULT_BODY_LIMIT);
    }
}
