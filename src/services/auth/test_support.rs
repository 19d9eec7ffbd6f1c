//! Shared fixtures for auth tests: fixture RSA keys, token minting, fetcher doubles.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header};
use serde::Serialize;
use serde_json::json;

use crate::services::auth::{
    error::AuthError,
    jwks::{JwksFetcher, SigningKey},
    key_resolver::KeyResolver,
    service::AuthService,
    verifier::TokenVerifier,
};

pub const ISSUER: &str = "https://casting-agency.eu.auth0.com/";
pub const AUDIENCE: &str = "casting";

pub const PRIMARY_KID: &str = "abc123";
pub const PRIMARY_PEM: &str = include_str!("testdata/primary.pem");
pub const PRIMARY_N: &str = "neQcadL3zXM4TwfV4TZ9TD3TKUAGBdHMImefC9DcYJJmeIV7rxPRTzR-4UMb_n59P5qxkM7c6u6MUWBJRkQ_fel56zoMd1qW__11r1E2v-Zhy1HLclfBjQaTsZTbBQLeXDzHxuds3xbxR5S5wrvhM3zehOHV2xYc6Voi8zb2yn0RnSIeLwcDjB5auSamnwqH2TrhD30IAGB0WloCChPnQ5x54gjc-tXqdFK6uqw39bFj-H5PKLD1rQA90u8NTQBndbLU-SexJ5hjaNlwHjHNx8o6D-U6FiI-XSOE-A2EMqc9nqGUGT0EV1D3AEoACJpESe1W8mdphTfgIPCAOJl_4w";

pub const ROTATED_KID: &str = "rot456";
pub const ROTATED_PEM: &str = include_str!("testdata/rotated.pem");
pub const ROTATED_N: &str = "qxHba4pPMKxYKTmd-56Df3YA9Znz1BYtwbfuMMWi5Hf77t2evkkcaG1FjQGQdcbqQxSfZslRgv-VFR588zii8be_HNr157YrAzQo2UzYiEPvA7pJBK6uq9BptO8-y0T_Um1qtjKJp4gZNUo41NoMjQDANZ8nqM77mg5uFzCcjHU4sAW1AmWGXfvXnjoAAzIoT0ag1yrvblF4zAUUpHDzMtRJkZb3Ri0zUTICH2ZESwohjDWaqp839SGxi06o7QgU-6ZN0ZLcjsaftmrCThO_P-2ELFEUBH2qK8lPr6-ItytYWbmgfViN64j19Hg7TvdMC6kgT0Y9XG4vNFRx2a4i0Q";

pub fn jwk_json(kid: &str, n: &str) -> serde_json::Value {
    json!({ "kty": "RSA", "use": "sig", "alg": "RS256", "kid": kid, "n": n, "e": "AQAB" })
}

pub fn rsa_key(kid: &str, n: &str) -> SigningKey {
    SigningKey {
        key_id: kid.to_string(),
        algorithm: Algorithm::RS256,
        decoding_key: DecodingKey::from_rsa_components(n, "AQAB").unwrap(),
    }
}

pub fn primary_key() -> SigningKey {
    rsa_key(PRIMARY_KID, PRIMARY_N)
}

pub fn rotated_key() -> SigningKey {
    rsa_key(ROTATED_KID, ROTATED_N)
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone, Serialize)]
pub struct TestClaims {
    pub iss: String,
    pub aud: serde_json::Value,
    pub sub: String,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl TestClaims {
    pub fn with_permissions(permissions: &[&str]) -> Self {
        Self {
            iss: ISSUER.to_string(),
            aud: json!(AUDIENCE),
            sub: "auth0|casting-director".to_string(),
            exp: now() + 3600,
            permissions: Some(permissions.iter().map(|p| p.to_string()).collect()),
        }
    }

    pub fn without_permissions() -> Self {
        Self {
            permissions: None,
            ..Self::with_permissions(&[])
        }
    }
}

pub fn sign_with(kid: &str, pem: &str, claims: &TestClaims) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(kid.to_string());
    let key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
    jsonwebtoken::encode(&header, claims, &key).unwrap()
}

pub fn sign(claims: &TestClaims) -> String {
    sign_with(PRIMARY_KID, PRIMARY_PEM, claims)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// Serves a fixed key set and counts how many times it was asked.
pub struct CountingFetcher {
    keys: Vec<SigningKey>,
    calls: AtomicUsize,
}

impl CountingFetcher {
    pub fn new(keys: Vec<SigningKey>) -> Self {
        Self {
            keys,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JwksFetcher for CountingFetcher {
    async fn fetch(&self) -> Result<Vec<SigningKey>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.keys.clone())
    }
}

/// Returns one key set per call, repeating the last one when exhausted.
pub struct SequenceFetcher {
    sets: Mutex<Vec<Vec<SigningKey>>>,
}

impl SequenceFetcher {
    pub fn new(mut sets: Vec<Vec<SigningKey>>) -> Self {
        sets.reverse();
        Self {
            sets: Mutex::new(sets),
        }
    }
}

#[async_trait]
impl JwksFetcher for SequenceFetcher {
    async fn fetch(&self) -> Result<Vec<SigningKey>, AuthError> {
        let mut sets = self.sets.lock().unwrap();
        let next = if sets.len() > 1 {
            sets.pop().unwrap_or_default()
        } else {
            sets.last().cloned().unwrap_or_default()
        };
        Ok(next)
    }
}

pub struct FailingFetcher;

#[async_trait]
impl JwksFetcher for FailingFetcher {
    async fn fetch(&self) -> Result<Vec<SigningKey>, AuthError> {
        Err(AuthError::KeyResolutionFailed("connection refused".into()))
    }
}

pub fn verifier_with(fetcher: Arc<dyn JwksFetcher>) -> TokenVerifier {
    TokenVerifier::new(Arc::new(KeyResolver::new(fetcher)), Algorithm::RS256, 0)
}

pub fn auth_service_with(fetcher: Arc<dyn JwksFetcher>) -> Arc<AuthService> {
    Arc::new(AuthService::new(
        verifier_with(fetcher),
        ISSUER.to_string(),
        AUDIENCE.to_string(),
    ))
}
