/*
 * Responsibility
 * - v1 の URL 構造を定義
 * - method ごとに必要な permission を protect() で付ける (route_layer なので未対応 method は 405 のまま)
 * - /health だけは認証なし
 */
use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::v1::handlers::{
    actors::{create_actor, delete_actor, get_actor, list_actors, update_actor},
    health::health,
    movies::{create_movie, delete_movie, get_movie, list_movies, update_movie},
};
use crate::middleware::auth::protect;
use crate::services::auth::Requirement;
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let auth = &state.auth;
    let need = Requirement::permission;

    Router::new()
        .route("/health", get(health))
        .route(
            "/movies",
            protect(get(list_movies), auth, need("get:movies"))
                .merge(protect(post(create_movie), auth, need("post:movies"))),
        )
        .route(
            "/movies/{movie_id}",
            protect(get(get_movie), auth, need("get:movies"))
                .merge(protect(patch(update_movie), auth, need("patch:movies")))
                .merge(protect(delete(delete_movie), auth, need("delete:movies"))),
        )
        .route(
            "/actors",
            protect(get(list_actors), auth, need("get:actors"))
                .merge(protect(post(create_actor), auth, need("post:actors"))),
        )
        .route(
            "/actors/{actor_id}",
            protect(get(get_actor), auth, need("get:actors"))
                .merge(protect(patch(update_actor), auth, need("patch:actors")))
                .merge(protect(delete(delete_actor), auth, need("delete:actors"))),
        )
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
        let state = AppState::for_tests(auth);

        Router::new()
            .nest("/api/v1", routes(&state))
            .with_state(state)
    }

    fn token(permissions: &[&str]) -> String {
        bearer(&sign(&TestClaims::with_permissions(permissions)))
    }

    async fn send(
        method: &str,
        uri: &str,
        authorization: Option<&str>,
        json: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(value) = authorization {
            req = req.header(header::AUTHORIZATION, value);
        }
        let body = match json {
            Some(json) => {
                req = req.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let res = app().oneshot(req.body(body).unwrap()).await.unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        (
            status,
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
        )
    }

    #[tokio::test]
    async fn health_needs_no_token() {
        let (status, body) = send("GET", "/api/v1/health", None, None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn every_resource_route_requires_a_token() {
        let cases = [
            ("GET", "/api/v1/movies"),
            ("POST", "/api/v1/movies"),
            ("GET", "/api/v1/movies/86Rf07xd4z"),
            ("PATCH", "/api/v1/movies/86Rf07xd4z"),
            ("DELETE", "/api/v1/movies/86Rf07xd4z"),
            ("GET", "/api/v1/actors"),
            ("POST", "/api/v1/actors"),
            ("GET", "/api/v1/actors/86Rf07xd4z"),
            ("PATCH", "/api/v1/actors/86Rf07xd4z"),
            ("DELETE", "/api/v1/actors/86Rf07xd4z"),
        ];

        for (method, uri) in cases {
            let (status, body) = send(method, uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"]["code"], "missing_credential");
        }
    }

    #[tokio::test]
    async fn casting_assistant_cannot_write() {
        let assistant = token(&["get:movies", "get:actors"]);

        let cases = [
            ("POST", "/api/v1/movies", "post:movies"),
            ("PATCH", "/api/v1/movies/86Rf07xd4z", "patch:movies"),
            ("DELETE", "/api/v1/movies/86Rf07xd4z", "delete:movies"),
            ("POST", "/api/v1/actors", "post:actors"),
            ("PATCH", "/api/v1/actors/86Rf07xd4z", "patch:actors"),
            ("DELETE", "/api/v1/actors/86Rf07xd4z", "delete:actors"),
        ];

        for (method, uri, permission) in cases {
            let (status, body) = send(method, uri, Some(&assistant), Some("{}")).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{method} {uri}");
            assert_eq!(
                body["error"]["message"],
                format!("permission not found: {permission}")
            );
        }
    }

    #[tokio::test]
    async fn malformed_public_id_is_400_after_authorization() {
        let (status, body) = send(
            "GET",
            "/api/v1/movies/not-a-public-id",
            Some(&token(&["get:movies"])),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_public_id");
    }

    #[tokio::test]
    async fn create_movie_without_release_date_is_422() {
        let (status, body) = send(
            "POST",
            "/api/v1/movies",
            Some(&token(&["post:movies"])),
            Some(r#"{"title":"Heat"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["message"], "release_date is required");
    }

    #[tokio::test]
    async fn create_actor_with_non_positive_age_is_422() {
        let (status, _) = send(
            "POST",
            "/api/v1/actors",
            Some(&token(&["post:actors"])),
            Some(r#"{"name":"Pam Grier","age":0,"gender":"F"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unreadable_json_body_is_400() {
        let (status, body) = send(
            "POST",
            "/api/v1/actors",
            Some(&token(&["post:actors"])),
            Some("{not json"),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "invalid_body");
    }

    #[tokio::test]
    async fn resource_handlers_refuse_to_run_unprotected() {
        let auth = auth_service_with(Arc::new(CountingFetcher::new(vec![primary_key()])));
        let state = AppState::for_tests(auth);
        let public_id = state.id_codec.encode(1).unwrap();
        let router: Router = Router::new()
            .route("/movies", get(list_movies))
            .route("/movies/{movie_id}", get(get_movie))
            .route("/actors", get(list_actors))
            .route("/actors/{actor_id}", get(get_actor))
            .with_state(state);

        for uri in [
            "/movies".to_string(),
            format!("/movies/{public_id}"),
            "/actors".to_string(),
            format!("/actors/{public_id}"),
        ] {
            let res = router
                .clone()
                .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn unsupported_method_is_405_without_auth() {
        let (status, _) = send("PUT", "/api/v1/movies", None, None).await;

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }
}
