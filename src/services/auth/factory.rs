/// Factory: build `AuthService` (key resolver + verifier) from application `Config`.
use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::services::auth::{AuthService, HttpJwksFetcher, KeyResolver, TokenVerifier};

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AppError> {
    let fetcher = HttpJwksFetcher::new(config.auth_jwks_url.clone(), config.jwks_fetch_timeout)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to build jwks http client");
            AppError::Internal
        })?;

    let resolver = Arc::new(KeyResolver::new(Arc::new(fetcher)));
    let verifier = TokenVerifier::new(
        resolver,
        config.auth_algorithm,
        config.access_token_leeway_seconds,
    );

    tracing::info!(
        jwks_url = %config.auth_jwks_url,
        algorithm = ?config.auth_algorithm,
        "auth service configured"
    );

    Ok(Arc::new(AuthService::new(
        verifier,
        config.auth_issuer.clone(),
        config.auth_audience.clone(),
    )))
}
