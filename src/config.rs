/*
 * Responsibility
 * - Load settings from the environment (.env supported via dotenvy)
 * - Validate them (fail at startup, not per request)
 * - Turn them into ExtractConfig / VerifyConfig for the middleware
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::services::extract::{
    BodyExtractor, DEFAULT_BODY_LIMIT, DEFAULT_HEADER_KEY, DEFAULT_HEADER_PREFIX,
    DEFAULT_QUERY_KEY, DEFAULT_TOKEN_FIELD, ExtractConfig, HeaderExtractor, HeaderSpec,
    QueryExtractor,
};
use crate::services::verify::{DEFAULT_DECODED_FIELD, JwtVerifier, SecretOrKey, VerifyConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value.unwrap_or("development").to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSetting {
    Query { key: String },
    Body { key: String },
    Header { key: String, prefix: String },
}

impl SourceSetting {
    pub fn label(&self) -> &'static str {
        match self {
            SourceSetting::Query { .. } => "query",
            SourceSetting::Body { .. } => "body",
            SourceSetting::Header { .. } => "header",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExtractSettings {
    pub sources: Vec<SourceSetting>,
    pub field: String,
    pub multi_tolerant: bool,
}

#[derive(Debug, Clone)]
pub struct VerifySettings {
    pub algorithm: Algorithm,
    pub secret_or_key: SecretOrKey,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    pub leeway_seconds: u64,
    pub field: String,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub body_limit: usize,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub http: HttpSettings,
    pub extract: ExtractSettings,
    pub verify: VerifySettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source (the environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = parse_or(&lookup, "PORT", 3000)?;
        let addr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let http = HttpSettings {
            body_limit: parse_or(&lookup, "BODY_LIMIT_BYTES", DEFAULT_BODY_LIMIT)?,
            request_timeout_seconds: parse_or(&lookup, "REQUEST_TIMEOUT_SECONDS", 30)?,
        };

        let extract = ExtractSettings {
            sources: parse_sources(&lookup)?,
            field: lookup("TOKEN_FIELD").unwrap_or_else(|| DEFAULT_TOKEN_FIELD.to_string()),
            multi_tolerant: parse_bool(&lookup, "TOKEN_MULTI_TOLERANT")?,
        };

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(alg) => {
                Algorithm::from_str(alg.trim()).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))?
            }
            None => Algorithm::HS256,
        };

        let secret_or_key = match (lookup("JWT_SECRET"), lookup("JWT_PUBLIC_KEY_PEM")) {
            (Some(secret), _) if !secret.is_empty() => SecretOrKey::secret(secret),
            (_, Some(pem)) if !pem.is_empty() => SecretOrKey::Pem(pem.replace("\\n", "\n")),
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        // A shared secret only verifies HMAC signatures.
        if matches!(secret_or_key, SecretOrKey::Secret(_)) && !is_hmac(algorithm) {
            return Err(ConfigError::Invalid("JWT_ALGORITHM"));
        }

        let verify = VerifySettings {
            algorithm,
            secret_or_key,
            issuer: lookup("JWT_ISSUER").filter(|s| !s.is_empty()),
            audience: lookup("JWT_AUDIENCE").filter(|s| !s.is_empty()),
            leeway_seconds: parse_or(&lookup, "JWT_LEEWAY_SECONDS", 60)?,
            field: lookup("DECODED_TOKEN_FIELD")
                .unwrap_or_else(|| DEFAULT_DECODED_FIELD.to_string()),
        };

        Ok(Self {
            addr,
            app_env,
            http,
            extract,
            verify,
        })
    }

    pub fn extract_config(&self) -> ExtractConfig {
        let builder = self
            .extract
            .sources
            .iter()
            .fold(ExtractConfig::builder(), |builder, source| match source {
                SourceSetting::Query { key } => {
                    builder.source(source.label(), QueryExtractor::new(key.as_str()))
                }
                SourceSetting::Body { key } => {
                    builder.source(source.label(), BodyExtractor::new(key.as_str()))
                }
                SourceSetting::Header { key, prefix } => builder.source(
                    source.label(),
                    HeaderExtractor::new(HeaderSpec::new(key.as_str()).with_prefix(prefix.as_str())),
                ),
            });

        builder
            .to(self.extract.field.as_str())
            .multi_tolerant(self.extract.multi_tolerant)
            .body_limit(self.http.body_limit)
            .build()
    }

    pub fn verify_config(&self) -> Result<VerifyConfig, ConfigError> {
        let settings = &self.verify;

        let mut validation = JwtVerifier::default_validation(settings.algorithm);
        validation.leeway = settings.leeway_seconds;
        if let Some(issuer) = &settings.issuer {
            validation.set_issuer(&[issuer]);
        }
        if let Some(audience) = &settings.audience {
            validation.set_audience(&[audience]);
            validation.validate_aud = true;
        }

        let verifier = JwtVerifier::new(&settings.secret_or_key, validation)
            .map_err(|_| ConfigError::Invalid("JWT_PUBLIC_KEY_PEM"))?;

        Ok(VerifyConfig::new(verifier)
            .write_to(settings.field.as_str())
            .with_body_limit(self.http.body_limit))
    }
}

fn is_hmac(algorithm: Algorithm) -> bool {
    matches!(
        algorithm,
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
    )
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn parse_bool<F>(lookup: &F, key: &'static str) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") | Some("no") => Ok(false),
        Some("true") | Some("1") | Some("yes") => Ok(true),
        Some(_) => Err(ConfigError::Invalid(key)),
    }
}

// TOKEN_SOURCES is an ordered, comma-separated list; order is precedence.
fn parse_sources<F>(lookup: &F) -> Result<Vec<SourceSetting>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let order = lookup("TOKEN_SOURCES").unwrap_or_else(|| "query,header".to_string());

    order
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|label| match label {
            "query" => Ok(SourceSetting::Query {
                key: lookup("TOKEN_QUERY_KEY").unwrap_or_else(|| DEFAULT_QUERY_KEY.to_string()),
            }),
            "body" => Ok(SourceSetting::Body {
                key: lookup("TOKEN_BODY_KEY").unwrap_or_else(|| DEFAULT_QUERY_KEY.to_string()),
            }),
            "header" => Ok(SourceSetting::Header {
                key: lookup("TOKEN_HEADER_KEY").unwrap_or_else(|| DEFAULT_HEADER_KEY.to_string()),
                prefix: lookup("TOKEN_HEADER_PREFIX")
                    .unwrap_or_else(|| DEFAULT_HEADER_PREFIX.to_string()),
            }),
            _ => Err(ConfigError::Invalid("TOKEN_SOURCES")),
        })
        .collect()
}
