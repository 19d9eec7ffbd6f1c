/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config 読み込み → 依存生成 (DB pool, migrations, id codec, auth) → Router 組み立て
 * - Middleware の適用 (HTTP / security headers / CORS)
 * - axum::serve() で起動
 */
use std::{panic, process};

use anyhow::{Context, Result};
use axum::Router;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api;
use crate::api::v1::handlers::fallback;
use crate::config::Config;
use crate::middleware;
use crate::services::{auth::build_auth_service, id_codec::IdCodec};
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set.
    // Ex: RUST_LOG=info,casting_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: fail fast
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    sqlx::migrate!()
        .run(&db)
        .await
        .context("failed to run migrations")?;

    let id_codec = IdCodec::new(config.sqids_min_length, &config.sqids_alphabet)?;

    // Keys are fetched lazily on the first token that needs them.
    let auth = build_auth_service(config)?;

    Ok(AppState::new(db, id_codec, auth))
}

fn build_router(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .nest("/api/v1", api::v1::routes(&state))
        .fallback(fallback::not_found)
        .method_not_allowed_fallback(fallback::method_not_allowed)
        .with_state(state);

    let router = middleware::http::apply(
        router,
        config.request_timeout,
        config.request_body_limit_bytes,
    );
    let router = middleware::security_headers::apply(router);
    middleware::cors::apply(router, config)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    use super::*;
    use crate::services::auth::test_support::{
        CountingFetcher, TestClaims, auth_service_with, bearer, primary_key, sign,
    };

    fn app() -> Router {
        let auth = auth_service_with(Arc::new(CountingFetcher::new(vec![primary_key()])));
        build_router(AppState::for_tests(auth), &Config::for_tests())
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/directors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn rejected_requests_still_carry_request_id_and_security_headers() {
        let token = bearer(&sign(&TestClaims::with_permissions(&["get:actors"])));

        let res = app()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/movies")
                    .header(header::AUTHORIZATION, token)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert!(res.headers().contains_key("x-request-id"));
        assert_eq!(res.headers()["x-content-type-options"], "nosniff");
    }

    #[tokio::test]
    async fn json_body_over_the_limit_is_413_not_invalid_body() {
        let auth = auth_service_with(Arc::new(CountingFetcher::new(vec![primary_key()])));
        let config = Config {
            request_body_limit_bytes: 64,
            ..Config::for_tests()
        };
        let app = build_router(AppState::for_tests(auth), &config);
        let token = bearer(&sign(&TestClaims::with_permissions(&["post:movies"])));
        let payload = format!(
            r#"{{"title":"{}","release_date":"1995-12-15"}}"#,
            "H".repeat(256)
        );

        let res = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/movies")
                    .header(header::AUTHORIZATION, token)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], "payload_too_large");
    }
}
