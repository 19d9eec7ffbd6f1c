/*
 * Responsibility
 * - 設定済みの issuer / audience で TokenVerifier を呼び出す
 * - 検証 → 認可 (permission check) を 1 回の呼び出しにまとめる
 * - middleware はこの AuthService だけを見る
 */
use crate::services::auth::{
    error::AuthError,
    permissions::{self, Requirement},
    verifier::{DecodedClaims, TokenVerifier},
};

#[derive(Debug)]
pub struct AuthService {
    verifier: TokenVerifier,
    issuer: String,
    audience: String,
}

impl AuthService {
    pub fn new(verifier: TokenVerifier, issuer: String, audience: String) -> Self {
        Self {
            verifier,
            issuer,
            audience,
        }
    }

    pub async fn authenticate(
        &self,
        raw_credential: Option<&str>,
    ) -> Result<DecodedClaims, AuthError> {
        self.verifier
            .verify(raw_credential, &self.audience, &self.issuer)
            .await
    }

    /// Verified **and** allowed, or the first reason it is not.
    pub async fn authorize(
        &self,
        raw_credential: Option<&str>,
        requirement: &Requirement,
    ) -> Result<DecodedClaims, AuthError> {
        let claims = self.authenticate(raw_credential).await?;
        permissions::check(&claims, requirement)?;
        Ok(claims)
    }
}
