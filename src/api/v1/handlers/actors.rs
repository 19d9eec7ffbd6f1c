/*
 * Responsibility
 * - /actors 系 CRUD handler
 * - Path の {actor_id} は公開 ID → extractor で内部 ID に変換して受け取る
 */
use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    api::v1::{
        dto::actors::{
            ActorEnvelope, ActorListResponse, ActorResponse, CreateActorRequest,
            UpdateActorRequest,
        },
        extractors::{AuthCtxExtractor, public_id::PublicActorId},
    },
    error::AppError,
    repos::actor_repo,
    state::AppState,
};

fn row_to_response(state: &AppState, row: actor_repo::ActorRow) -> Result<ActorResponse, AppError> {
    Ok(ActorResponse {
        id: state.id_codec.encode(row.actor_id)?,
        name: row.name,
        age: row.age,
        gender: row.gender,
    })
}

pub async fn list_actors(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
) -> Result<Json<ActorListResponse>, AppError> {
    let rows = actor_repo::list(&state.db).await?;
    if rows.is_empty() {
        return Err(AppError::not_found("actors"));
    }

    let mut actors = Vec::with_capacity(rows.len());
    for row in rows {
        actors.push(row_to_response(&state, row)?);
    }

    tracing::debug!(sub = %ctx.subject(), count = actors.len(), "listed actors");

    Ok(Json(ActorListResponse { actors }))
}

pub async fn get_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    actor_id: PublicActorId,
) -> Result<Json<ActorEnvelope>, AppError> {
    let row = actor_repo::get(&state.db, actor_id.id)
        .await?
        .ok_or(AppError::not_found("actor"))?;

    tracing::debug!(sub = %ctx.subject(), actor_id = actor_id.id, "fetched actor");

    Ok(Json(ActorEnvelope {
        actor: row_to_response(&state, row)?,
    }))
}

pub async fn create_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    payload: Result<Json<CreateActorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ActorEnvelope>), AppError> {
    let Json(req) = payload?;
    let new_actor = req.validate().map_err(AppError::unprocessable)?;

    let row = actor_repo::create(&state.db, new_actor.name, new_actor.age, new_actor.gender).await?;
    let actor = row_to_response(&state, row)?;

    tracing::info!(sub = %ctx.subject(), actor_id = %actor.id, "actor created");
    Ok((StatusCode::CREATED, Json(ActorEnvelope { actor })))
}

pub async fn update_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    actor_id: PublicActorId,
    payload: Result<Json<UpdateActorRequest>, JsonRejection>,
) -> Result<Json<ActorEnvelope>, AppError> {
    let Json(req) = payload?;
    req.validate().map_err(AppError::unprocessable)?;

    let row = actor_repo::update(
        &state.db,
        actor_id.id,
        req.name.as_deref().map(str::trim),
        req.age,
        req.gender.as_deref().map(str::trim),
    )
    .await?
    .ok_or(AppError::not_found("actor"))?;
    let actor = row_to_response(&state, row)?;

    tracing::info!(sub = %ctx.subject(), actor_id = %actor.id, "actor updated");
    Ok(Json(ActorEnvelope { actor }))
}

pub async fn delete_actor(
    State(state): State<AppState>,
    AuthCtxExtractor(ctx): AuthCtxExtractor,
    actor_id: PublicActorId,
) -> Result<Json<Value>, AppError> {
    if !actor_repo::delete(&state.db, actor_id.id).await? {
        return Err(AppError::not_found("actor"));
    }

    let public_id = state.id_codec.encode(actor_id.id)?;
    tracing::info!(sub = %ctx.subject(), actor_id = %public_id, "actor deleted");

    Ok(Json(json!({ "deleted": public_id })))
}
