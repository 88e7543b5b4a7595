use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde_json::Value;
use std::fmt;

/// The external verification primitive.
///
/// Implementations check a token and return its decoded payload. Errors are
/// surfaced to callers unchanged.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Value, jsonwebtoken::errors::Error>;
}

/// Key material for [`JwtVerifier`].
///
/// - `Secret`: raw bytes for HS256/384/512
/// - `Pem`: public key PEM; RSA, EC or Ed25519 depending on the algorithm
#[derive(Clone)]
pub enum SecretOrKey {
    Secret(Vec<u8>),
    Pem(String),
}

impl SecretOrKey {
    pub fn secret(secret: impl AsRef<[u8]>) -> Self {
        Self::Secret(secret.as_ref().to_vec())
    }

    pub fn decoding_key(&self, algorithm: Algorithm) -> Result<DecodingKey, jsonwebtoken::errors::Error> {
        match self {
            Self::Secret(secret) => Ok(DecodingKey::from_secret(secret)),
            Self::Pem(pem) => match algorithm {
                Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                    Ok(DecodingKey::from_secret(pem.as_bytes()))
                }
                Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(pem.as_bytes()),
                Algorithm::EdDSA => DecodingKey::from_ed_pem(pem.as_bytes()),
                _ => DecodingKey::from_rsa_pem(pem.as_bytes()),
            },
        }
    }
}

impl fmt::Debug for SecretOrKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            Self::Secret(_) => f.write_str("SecretOrKey::Secret(..)"),
            Self::Pem(_) => f.write_str("SecretOrKey::Pem(..)"),
        }
    }
}

/// `jsonwebtoken`-backed verifier.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    /// The key is built for the first algorithm listed in `validation`.
    pub fn new(
        secret_or_key: &SecretOrKey,
        validation: Validation,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let algorithm = validation.algorithms.first().copied().unwrap_or_default();
        let decoding_key = secret_or_key.decoding_key(algorithm)?;

        Ok(Self {
            decoding_key,
            validation,
        })
    }

    pub fn from_key(decoding_key: DecodingKey, validation: Validation) -> Self {
        Self {
            decoding_key,
            validation,
        }
    }

    /// HS256 with a shared secret and [`JwtVerifier::default_validation`].
    pub fn hs256(secret: impl AsRef<[u8]>) -> Self {
        Self::from_key(
            DecodingKey::from_secret(secret.as_ref()),
            Self::default_validation(Algorithm::HS256),
        )
    }

    /// Signature check plus `exp`/`nbf` when present; no claim is mandatory
    /// and `aud` is only checked once an audience is configured.
    pub fn default_validation(algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Value, jsonwebtoken::errors::Error> {
        let data = jsonwebtoken::decode::<Value>(token, &self.decoding_key, &self.validation)?;
        Ok(data.claims)
    }
}
