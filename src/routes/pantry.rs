use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use mealmate_pantry::{AddItemInput, IngredientRow, PantryFilter, PantryItemRow, UpdateItemInput};
use serde::Deserialize;

use super::AppState;
use crate::{auth::AuthUser, error::Result};

#[derive(Deserialize)]
pub struct IngredientQuery {
    #[serde(default)]
    pub search: String,
    pub limit: Option<u64>,
}

pub async fn ingredients(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<IngredientRow>>> {
    let rows =
        mealmate_pantry::search_ingredients(&state.pool, &query.search, query.limit.unwrap_or(10))
            .await?;

    Ok(Json(rows))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(filter): Query<PantryFilter>,
) -> Result<Json<Vec<PantryItemRow>>> {
    Ok(Json(state.pantry_command.list(&auth.user_id, filter).await?))
}

#[derive(Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

pub async fn expiring(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<Vec<PantryItemRow>>> {
    let items = state
        .pantry_command
        .expiring(&auth.user_id, query.days.unwrap_or(7), mealmate_shared::today())
        .await?;

    Ok(Json(items))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<PantryItemRow>> {
    Ok(Json(state.pantry_command.get(&auth.user_id, &id).await?))
}

pub async fn add(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<AddItemInput>,
) -> Result<impl IntoResponse> {
    let item = state.pantry_command.add(&auth.user_id, input).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<UpdateItemInput>,
) -> Result<Json<PantryItemRow>> {
    Ok(Json(
        state.pantry_command.update(&auth.user_id, &id, input).await?,
    ))
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.pantry_command.remove(&auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}
