//! Identity provider key set (JWKS): fetch over HTTP and parse into signing keys.
//!
//! Responsibility:
//! - `JwksFetcher` trait so the resolver can be driven by a test double.
//! - `HttpJwksFetcher`: GET <jwks url> with a bounded timeout.
//! - Turn `{"keys": [...]}` into `SigningKey`s usable by jsonwebtoken.
//!
//! Records we cannot use (encryption keys, unknown kty, broken material) are
//! skipped with a warning; one odd key must not take the whole set down.

use std::{fmt, str::FromStr, time::Duration};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey};
use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::services::auth::error::AuthError;

/// A public key published by the identity provider.
#[derive(Clone)]
pub struct SigningKey {
    pub key_id: String,
    pub algorithm: Algorithm,
    pub decoding_key: DecodingKey,
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        f.debug_struct("SigningKey")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

#[async_trait]
pub trait JwksFetcher: Send + Sync {
    /// Fetch the full key set. Any transport/parse failure is `KeyResolutionFailed`.
    async fn fetch(&self) -> Result<Vec<SigningKey>, AuthError>;
}

pub struct HttpJwksFetcher {
    client: reqwest::Client,
    url: Url,
}

impl HttpJwksFetcher {
    pub fn new(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

impl fmt::Debug for HttpJwksFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpJwksFetcher")
            .field("url", &self.url.as_str())
            .finish()
    }
}

#[async_trait]
impl JwksFetcher for HttpJwksFetcher {
    async fn fetch(&self) -> Result<Vec<SigningKey>, AuthError> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(|res| res.error_for_status())
            .map_err(|e| {
                let reason = if e.is_timeout() {
                    format!("key set request timed out: {e}")
                } else {
                    format!("key set request failed: {e}")
                };
                AuthError::KeyResolutionFailed(reason)
            })?;

        let body = response
            .bytes()
            .await
            .map_err(|e| AuthError::KeyResolutionFailed(format!("key set body: {e}")))?;

        parse_key_set(&body)
    }
}

#[derive(Debug, Deserialize)]
struct JwkSetDocument {
    keys: Vec<serde_json::Value>,
}

// Only the members we need; everything else (x5c, x5t, ...) is ignored.
#[derive(Debug, Deserialize)]
struct JwkRecord {
    kid: Option<String>,
    kty: Option<String>,
    alg: Option<String>,
    #[serde(rename = "use")]
    key_use: Option<String>,
    crv: Option<String>,
    n: Option<String>,
    e: Option<String>,
    x: Option<String>,
    y: Option<String>,
}

pub fn parse_key_set(body: &[u8]) -> Result<Vec<SigningKey>, AuthError> {
    let document: JwkSetDocument = serde_json::from_slice(body)
        .map_err(|e| AuthError::KeyResolutionFailed(format!("invalid key set document: {e}")))?;

    let mut keys = Vec::with_capacity(document.keys.len());
    for value in document.keys {
        let record = match serde_json::from_value::<JwkRecord>(value) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "skipping unreadable jwk");
                continue;
            }
        };

        match signing_key_from_record(record) {
            Ok(key) => keys.push(key),
            Err(reason) => warn!(%reason, "skipping unusable jwk"),
        }
    }

    Ok(keys)
}

fn signing_key_from_record(record: JwkRecord) -> Result<SigningKey, String> {
    let key_id = record.kid.ok_or("missing kid")?;

    if let Some(key_use) = record.key_use.as_deref()
        && key_use != "sig"
    {
        return Err(format!("kid {key_id}: use '{key_use}' is not a signature key"));
    }

    let kty = record.kty.as_deref().unwrap_or_default();
    let crv = record.crv.as_deref();

    let algorithm = match record.alg.as_deref() {
        Some(alg) => {
            Algorithm::from_str(alg).map_err(|_| format!("kid {key_id}: unknown alg '{alg}'"))?
        }
        None => implied_algorithm(kty, crv)
            .ok_or_else(|| format!("kid {key_id}: cannot infer alg for kty '{kty}'"))?,
    };

    let decoding_key = match kty {
        "RSA" => {
            let n = record.n.as_deref().ok_or("RSA key without 'n'")?;
            let e = record.e.as_deref().ok_or("RSA key without 'e'")?;
            DecodingKey::from_rsa_components(n, e)
        }
        "EC" => {
            let x = record.x.as_deref().ok_or("EC key without 'x'")?;
            let y = record.y.as_deref().ok_or("EC key without 'y'")?;
            DecodingKey::from_ec_components(x, y)
        }
        "OKP" => {
            let x = record.x.as_deref().ok_or("OKP key without 'x'")?;
            DecodingKey::from_ed_components(x)
        }
        other => return Err(format!("kid {key_id}: unsupported kty '{other}'")),
    }
    .map_err(|e| format!("kid {key_id}: invalid key material: {e}"))?;

    Ok(SigningKey {
        key_id,
        algorithm,
        decoding_key,
    })
}

fn implied_algorithm(kty: &str, crv: Option<&str>) -> Option<Algorithm> {
    match (kty, crv) {
        ("RSA", _) => Some(Algorithm::RS256),
        ("EC", Some("P-256")) => Some(Algorithm::ES256),
        ("EC", Some("P-384")) => Some(Algorithm::ES384),
        ("OKP", Some("Ed25519")) => Some(Algorithm::EdDSA),
        _ => None,
    }
}
