use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use mealmate_mealplan::{EntryInput, EntryRow, PlanDetail, PlanInput, PlanRow, ShoppingList};
use mealmate_shared::Page;

use super::{AppState, PageQuery};
use crate::{auth::AuthUser, error::Result};

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Page<PlanRow>>> {
    let page = state
        .mealplan_command
        .list(&auth.user_id, query.pagination())
        .await?;

    Ok(Json(page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PlanDetail>> {
    Ok(Json(state.mealplan_command.get(&auth.user_id, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<PlanInput>,
) -> Result<impl IntoResponse> {
    let plan = state.mealplan_command.create(&auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(plan)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<PlanInput>,
) -> Result<Json<PlanDetail>> {
    Ok(Json(
        state
            .mealplan_command
            .update(&auth.user_id, &id, input)
            .await?,
    ))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.mealplan_command.delete(&auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<EntryInput>,
) -> Result<impl IntoResponse> {
    let entry = state
        .mealplan_command
        .add_entry(&auth.user_id, &id, input)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, entry_id)): Path<(String, String)>,
    Json(input): Json<EntryInput>,
) -> Result<Json<EntryRow>> {
    let entry = state
        .mealplan_command
        .update_entry(&auth.user_id, &id, &entry_id, input)
        .await?;

    Ok(Json(entry))
}

pub async fn remove_entry(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, entry_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    state
        .mealplan_command
        .remove_entry(&auth.user_id, &id, &entry_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn shopping_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ShoppingList>> {
    Ok(Json(
        state
            .mealplan_command
            .shopping_list(&auth.user_id, &id)
            .await?,
    ))
}
