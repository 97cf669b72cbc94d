use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mealmate_family::{MemberInput, MemberRow};

use super::AppState;
use crate::{auth::AuthUser, error::Result};

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MemberRow>>> {
    Ok(Json(state.family_command.list(&auth.user_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MemberRow>> {
    Ok(Json(state.family_command.get(&auth.user_id, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<MemberInput>,
) -> Result<impl IntoResponse> {
    let member = state.family_command.create(&auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<MemberInput>,
) -> Result<Json<MemberRow>> {
    Ok(Json(
        state.family_command.update(&auth.user_id, &id, input).await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.family_command.delete(&auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
