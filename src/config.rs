/*
 * Responsibility
 * - 環境変数 (.env) からの設定読み込み
 * - 必須値が無い / 解釈できない場合は起動失敗 (ConfigError)
 * - Auth 関連: issuer / audience / JWKS URL / 署名アルゴリズム / leeway / fetch timeout
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use jsonwebtoken::Algorithm;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, PartialEq, Eq)]
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

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,

    pub app_env: AppEnv,
    pub cors_allowed_origins: Vec<String>,

    pub request_timeout: Duration,
    pub request_body_limit_bytes: usize,

    pub sqids_min_length: usize,
    pub sqids_alphabet: String,

    pub auth_issuer: String,
    pub auth_audience: String,
    pub auth_jwks_url: Url,
    pub auth_algorithm: Algorithm,
    pub access_token_leeway_seconds: u64,
    pub jwks_fetch_timeout: Duration,
}

/// Absent or blank → `default`; present but unparsable → `ConfigError::Invalid`.
fn parse_or<T: FromStr>(
    key: &'static str,
    raw: Option<&str>,
    default: T,
) -> Result<T, ConfigError> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

fn env_or<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    parse_or(key, std::env::var(key).ok().as_deref(), default)
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

/// Auth0-style default: `<issuer>/.well-known/jwks.json`.
pub fn default_jwks_url(issuer: &str) -> Result<Url, ConfigError> {
    let base = if issuer.ends_with('/') {
        issuer.to_string()
    } else {
        format!("{}/", issuer)
    };

    Url::parse(&base)
        .and_then(|url| url.join(".well-known/jwks.json"))
        .map_err(|_| ConfigError::Invalid("AUTH_ISSUER"))
}

/// Only asymmetric algorithms: the service holds public keys, never a shared secret.
pub fn parse_signing_algorithm(value: &str) -> Result<Algorithm, ConfigError> {
    let algorithm =
        Algorithm::from_str(value.trim()).map_err(|_| ConfigError::Invalid("AUTH_ALGORITHM"))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
            Err(ConfigError::Invalid("AUTH_ALGORITHM"))
        }
        asymmetric => Ok(asymmetric),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = env_or("PORT", 3000)?;

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let database_url = required("DATABASE_URL")?;

        let app_env = AppEnv::from_env();

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = Duration::from_secs(env_or("REQUEST_TIMEOUT_SECONDS", 30)?);
        let request_body_limit_bytes = env_or("REQUEST_BODY_LIMIT_BYTES", 1024 * 1024)?;

        let sqids_min_length = env_or("SQIDS_MIN_LENGTH", 10)?;
        let sqids_alphabet = std::env::var("SQIDS_ALPHABET").unwrap_or_else(|_| {
            "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789".to_string()
        });

        let auth_issuer = required("AUTH_ISSUER")?;
        let auth_audience = required("AUTH_AUDIENCE")?;

        let auth_jwks_url = match std::env::var("AUTH_JWKS_URL") {
            Ok(raw) if !raw.trim().is_empty() => {
                Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?
            }
            _ => default_jwks_url(&auth_issuer)?,
        };

        let auth_algorithm = match std::env::var("AUTH_ALGORITHM") {
            Ok(raw) => parse_signing_algorithm(&raw)?,
            Err(_) => Algorithm::RS256,
        };

        let access_token_leeway_seconds = env_or("ACCESS_TOKEN_LEEWAY_SECONDS", 0)?;
        let jwks_fetch_timeout = Duration::from_secs(env_or("JWKS_FETCH_TIMEOUT_SECONDS", 5)?);

        Ok(Self {
            addr,
            database_url,
            app_env,
            cors_allowed_origins,
            request_timeout,
            request_body_limit_bytes,
            sqids_min_length,
            sqids_alphabet,
            auth_issuer,
            auth_audience,
            auth_jwks_url,
            auth_algorithm,
            access_token_leeway_seconds,
            jwks_fetch_timeout,
        })
    }
}

#[cfg(test)]
impl Config {
    /// Development config pointing at the test identity provider.
    pub fn for_tests() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            database_url: "postgres://localhost/casting_test".to_string(),
            app_env: AppEnv::Development,
            cors_allowed_origins: Vec::new(),
            request_timeout: Duration::from_secs(30),
            request_body_limit_bytes: 1024 * 1024,
            sqids_min_length: 10,
            sqids_alphabet: "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789"
                .to_string(),
            auth_issuer: "https://casting-agency.eu.auth0.com/".to_string(),
            auth_audience: "casting".to_string(),
            auth_jwks_url: Url::parse("https://casting-agency.eu.auth0.com/.well-known/jwks.json")
                .unwrap(),
            auth_algorithm: Algorithm::RS256,
            access_token_leeway_seconds: 0,
            jwks_fetch_timeout: Duration::from_secs(5),
        }
    }
}
