pub mod config;
pub mod verifier;

pub use config::{DEFAULT_DECODED_FIELD, VerifyConfig};
pub use verifier::{JwtVerifier, SecretOrKey, TokenVerifier};
