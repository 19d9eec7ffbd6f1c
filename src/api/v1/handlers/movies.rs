/*
 * Responsibility
 * - /movies 系 CRUD handler
 * - 認証・認可は route 側の protect() で済んでいる前提 (ここでは AuthCtx をログ相関に使うだけ)
 * - Path の {movie_id} は公開 ID → extractor で内部 ID に変換して受け取る
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    api::v1::{
        dto::movies::{
            CreateMovieRequest, MovieEnvelope, MovieListResponse, MovieResponse,
            UpdateMovieRequest,
        },
        extractors::{AuthCtxExtractor, public_id::PublicMovieId},
    },
    error::AppError,
    repos::movie_repo,
    state::AppState,
};

fn row_to_response(state: &AppState, row: movie_repo::MovieRow) -> Result<MovieResponse, AppError> {
    Ok(MovieResponse {
        id: state.id_codec.encode(row.movie_id)?,
        title: row.title,
        release_date: row.release_date,
    })
}

pub async fn list_movies(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<MovieListResponse>, AppError> {
    let rows = movie_repo::list(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::not_found("movies"));
    }

    let movies = rows
        .into_iter()
        .map(|row| row_to_response(&state, row))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::debug!(sub = %ctx.subject(), count = movies.len(), "listed movies");
    Ok(Json(MovieListResponse { movies }))
}

pub async fn get_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    movie_id: PublicMovieId,
) -> Result<Json<MovieEnvelope>, AppError> {
    let row = movie_repo::get(&state.db, movie_id.id)
        .await?
        .ok_or(AppError::not_found("movie"))?;

    tracing::debug!(sub = %ctx.subject(), movie_id = movie_id.id, "fetched movie");

    Ok(Json(MovieEnvelope {
        movie: row_to_response(&state, row)?,
    }))
}

pub async fn create_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    payload: Result<Json<CreateMovieRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MovieEnvelope>), AppError> {
    let Json(req) = payload?;
    let (title, release_date) = req.validate().map_err(AppError::unprocessable)?;

    let row = movie_repo::create(&state.db, title, release_date).await?;
    let movie = row_to_response(&state, row)?;

    tracing::info!(sub = %ctx.subject(), movie_id = %movie.id, "movie created");
    Ok((StatusCode::CREATED, Json(MovieEnvelope { movie })))
}

pub async fn update_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    movie_id: PublicMovieId,
    payload: Result<Json<UpdateMovieRequest>, JsonRejection>,
) -> Result<Json<MovieEnvelope>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::unprocessable)?;

    let title = req.title.as_deref().map(str::trim);
    let release_date = req.release_date.as_deref().map(str::trim);

    let row = movie_repo::update(&state.db, movie_id.id, title, release_date)
        .await?
        .ok_or(AppError::not_found("movie"))?;
    let movie = row_to_response(&state, row)?;

    tracing::info!(sub = %ctx.subject(), movie_id = %movie.id, "movie updated");
    Ok(Json(MovieEnvelope { movie }))
}

pub async fn delete_movie(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    movie_id: PublicMovieId,
) -> Result<Json<Value>, AppError> {
    if !movie_repo::delete(&state.db, movie_id.id).await? {
        return Err(AppError::not_found("movie"));
    }

    let public_id = state.id_codec.encode(movie_id.id)?;
    tracing::info!(sub = %ctx.subject(), movie_id = %public_id, "movie deleted");

    Ok(Json(json!({ "deleted": public_id })))
}
