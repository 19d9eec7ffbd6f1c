//! Per-route access control: verify the bearer token, enforce the route's
//! permission, then hand `AuthCtx` to the handler via request extensions.
//!
//! Rejections are returned as `AppError::Auth`; the handler never runs for a
//! rejected request.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::MethodRouter,
};

use crate::api::v1::extractors::AuthCtx;
use crate::error::AppError;
use crate::services::auth::{AuthError, AuthService, Requirement};

/// What one protected route needs: the shared auth service and its own requirement.
#[derive(Clone)]
pub struct AccessGuard {
    auth: Arc<AuthService>,
    requirement: Requirement,
}

/// Wrap a method router so every request must satisfy `requirement`.
///
/// ```ignore
/// .route("/movies", protect(get(list_movies), &auth, Requirement::permission("get:movies")))
/// ```
pub fn protect<S>(
    route: MethodRouter<S>,
    auth: &Arc<AuthService>,
    requirement: Requirement,
) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    let guard = AccessGuard {
        auth: Arc::clone(auth),
        requirement,
    };

    // route_layer: unmatched methods still fall through to 405 instead of 401
    route.route_layer(middleware::from_fn_with_state(guard, access_middleware))
}

async fn access_middleware(
    State(guard): State<AccessGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let raw_credential = match req.headers().get(header::AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::Auth(AuthError::MalformedCredential))?,
        ),
        None => None,
    };

    let claims = match guard.auth.authorize(raw_credential, &guard.requirement).await {
        Ok(claims) => claims,
        Err(err) => {
            tracing::warn!(
                code = err.code(),
                method = %req.method(),
                path = %req.uri().path(),
                "access denied"
            );
            return Err(AppError::Auth(err));
        }
    };

    tracing::debug!(sub = %claims.subject, exp = %claims.expiry, "access granted");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(AuthCtx::new(claims));

    Ok(next.run(req).await)
}
