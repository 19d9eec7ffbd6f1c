/*
 * Responsibility
 * - 認証・認可の失敗を 1 つの型 (AuthError) で表す
 * - kind ごとの HTTP status / 機械可読な code を決める (401 or 403)
 * - IntoResponse への変換は error.rs (AppError) 側の責務
 */
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    // credential shape
    #[error("authorization header is expected")]
    MissingCredential,
    #[error("authorization header must be in the form 'Bearer <token>'")]
    MalformedCredential,

    // cryptographic
    #[error("token algorithm is not accepted: {0}")]
    UnsupportedAlgorithm(String),
    #[error("token signature is invalid")]
    InvalidSignature,

    // temporal / claims
    #[error("token expired")]
    TokenExpired,
    #[error("incorrect claims: {0}")]
    InvalidClaims(String),

    // key resolution
    #[error("unable to find the appropriate key")]
    KeyNotFound(String),
    // Detail is for logs only; Display stays generic.
    #[error("unable to resolve signing keys")]
    KeyResolutionFailed(String),

    // authorization
    #[error("permissions not included in token")]
    PermissionsClaimMissing,
    #[error("permission not found: {0}")]
    PermissionDenied(String),
}

impl AuthError {
    /// 401: the caller could not be authenticated.
    /// 403: the caller is known but not allowed.
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::PermissionsClaimMissing | AuthError::PermissionDenied(_) => {
                StatusCode::FORBIDDEN
            }
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingCredential => "missing_credential",
            AuthError::MalformedCredential => "malformed_credential",
            AuthError::UnsupportedAlgorithm(_) => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidClaims(_) => "invalid_claims",
            AuthError::KeyNotFound(_) => "key_not_found",
            AuthError::KeyResolutionFailed(_) => "key_resolution_failed",
            AuthError::PermissionsClaimMissing => "permissions_claim_missing",
            AuthError::PermissionDenied(_) => "permission_denied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_map_to_401() {
        let errors = [
            AuthError::MissingCredential,
            AuthError::MalformedCredential,
            AuthError::UnsupportedAlgorithm("HS256".into()),
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
            AuthError::InvalidClaims("iss".into()),
            AuthError::KeyNotFound("abc123".into()),
            AuthError::KeyResolutionFailed("timeout".into()),
        ];

        for err in errors {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "{err:?}");
        }
    }

    #[test]
    fn authorization_failures_map_to_403() {
        assert_eq!(
            AuthError::PermissionsClaimMissing.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::PermissionDenied("post:movies".into()).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn resolution_failure_message_hides_detail() {
        let err = AuthError::KeyResolutionFailed("connect error: 10.0.0.3:443".into());
        assert!(!err.to_string().contains("10.0.0.3"));
    }
}
