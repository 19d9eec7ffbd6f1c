//! Access token verification: bearer shape → header → key → signature → claims.
//!
//! Every step returns `AuthError` and short-circuits with `?`; no step swallows
//! the kind reported by the one before it.

use std::{collections::BTreeSet, str::FromStr, sync::Arc};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation, errors::ErrorKind};
use serde::{Deserialize, Deserializer};

use crate::services::auth::{error::AuthError, key_resolver::KeyResolver};

/// Claims of a verified access token, handed to handlers read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedClaims {
    pub issuer: String,
    pub audience: Vec<String>,
    pub subject: String,
    pub expiry: DateTime<Utc>,
    // None: claim absent. Some(empty): claim present but grants nothing.
    pub permissions: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Deserialize)]
struct AccessTokenClaims {
    iss: String,
    #[serde(deserialize_with = "string_or_list")]
    aud: Vec<String>,
    sub: String,
    exp: i64,
    #[serde(default)]
    permissions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenHeader {
    alg: String,
    #[serde(default)]
    kid: Option<String>,
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    // `aud` may be a single string or an array of strings
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(aud) => vec![aud],
        OneOrMany::Many(auds) => auds,
    })
}

/// Pull the token out of an `Authorization` value.
///
/// Exactly `Bearer <token>`: two parts split on a single space, scheme spelled
/// `Bearer`, token non-empty.
pub fn bearer_token(raw_credential: Option<&str>) -> Result<&str, AuthError> {
    let raw = raw_credential.ok_or(AuthError::MissingCredential)?;

    let mut parts = raw.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedCredential),
    }
}

fn decode_header(token: &str) -> Result<TokenHeader, AuthError> {
    let mut segments = token.split('.');
    let (Some(header), Some(_payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedCredential);
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| AuthError::MalformedCredential)?;

    serde_json::from_slice(&bytes).map_err(|_| AuthError::MalformedCredential)
}

fn classify(err: jsonwebtoken::errors::Error, alg: &str) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        ErrorKind::InvalidIssuer => AuthError::InvalidClaims("incorrect issuer".into()),
        ErrorKind::InvalidAudience => AuthError::InvalidClaims("incorrect audience".into()),
        ErrorKind::ImmatureSignature => AuthError::InvalidClaims("token not yet valid".into()),
        ErrorKind::MissingRequiredClaim(claim) => {
            AuthError::InvalidClaims(format!("missing '{claim}' claim"))
        }
        ErrorKind::Json(_) => AuthError::InvalidClaims("claims could not be parsed".into()),
        ErrorKind::InvalidAlgorithm => AuthError::UnsupportedAlgorithm(alg.to_string()),
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
            AuthError::MalformedCredential
        }
        // key/crypto backend failures: the signature could not be verified
        _ => AuthError::InvalidSignature,
    }
}

pub struct TokenVerifier {
    resolver: Arc<KeyResolver>,
    algorithm: Algorithm,
    leeway_seconds: u64,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithm", &self.algorithm)
            .field("leeway_seconds", &self.leeway_seconds)
            .finish()
    }
}

impl TokenVerifier {
    /// `algorithm` is the provider's asymmetric signing algorithm; it is the
    /// only one accepted.
    pub fn new(resolver: Arc<KeyResolver>, algorithm: Algorithm, leeway_seconds: u64) -> Self {
        Self {
            resolver,
            algorithm,
            leeway_seconds,
        }
    }

    pub async fn verify(
        &self,
        raw_credential: Option<&str>,
        required_audience: &str,
        required_issuer: &str,
    ) -> Result<DecodedClaims, AuthError> {
        // 1-2) shape
        let token = bearer_token(raw_credential)?;

        // 3) header: kid + alg
        let header = decode_header(token)?;
        let algorithm = Algorithm::from_str(&header.alg)
            .ok()
            .filter(|alg| *alg == self.algorithm)
            .ok_or_else(|| AuthError::UnsupportedAlgorithm(header.alg.clone()))?;
        let kid = header.kid.ok_or(AuthError::MalformedCredential)?;

        // 4) key
        let key = self.resolver.resolve(&kid).await?;
        if key.algorithm != algorithm {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }

        // 5-6) signature, then iss/aud/exp
        let mut validation = Validation::new(algorithm);
        validation.set_issuer(&[required_issuer]);
        validation.set_audience(&[required_audience]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        validation.leeway = self.leeway_seconds;

        let data =
            jsonwebtoken::decode::<AccessTokenClaims>(token, &key.decoding_key, &validation)
                .map_err(|e| classify(e, &header.alg))?;

        // valid strictly before exp (jsonwebtoken itself lets exp == now through)
        let claims = data.claims;
        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        if claims.exp <= Utc::now().timestamp().saturating_sub(leeway) {
            return Err(AuthError::TokenExpired);
        }

        // 7) claims → application type
        let expiry = DateTime::<Utc>::from_timestamp(claims.exp, 0)
            .ok_or_else(|| AuthError::InvalidClaims("'exp' out of range".into()))?;

        Ok(DecodedClaims {
            issuer: claims.iss,
            audience: claims.aud,
            subject: claims.sub,
            expiry,
            permissions: claims.permissions.map(|p| p.into_iter().collect()),
        })
    }
}
