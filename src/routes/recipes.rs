use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use mealmate_recipe::{ImportReport, RateInput, RatingSummary, RecipeFilter, RecipeInput, RecipeView};
use mealmate_shared::{
    Page, Pagination,
    recipe::{MealType, RecipeSource},
};
use serde::Deserialize;

use super::AppState;
use crate::{
    auth::AuthUser,
    error::{AppError, Result},
};

#[derive(Deserialize, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub meal_type: Option<MealType>,
    pub favorite: Option<bool>,
    pub source: Option<RecipeSource>,
    pub tag: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl From<ListQuery> for RecipeFilter {
    fn from(query: ListQuery) -> Self {
        Self {
            search: query.search.filter(|s| !s.trim().is_empty()),
            meal_type: query.meal_type,
            favorite: query.favorite,
            source: query.source,
            tag: query.tag.filter(|t| !t.trim().is_empty()),
            pagination: Pagination::new(query.page, query.limit),
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<RecipeView>>> {
    let page = state
        .recipe_command
        .list(&auth.user_id, query.into())
        .await?;

    Ok(Json(page))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<RecipeView>> {
    Ok(Json(state.recipe_command.get(&auth.user_id, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<RecipeInput>,
) -> Result<impl IntoResponse> {
    let id = state.recipe_command.create(&auth.user_id, input).await?;
    let recipe = state.recipe_command.get(&auth.user_id, &id).await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<RecipeInput>,
) -> Result<Json<RecipeView>> {
    state
        .recipe_command
        .update(&auth.user_id, &id, input)
        .await?;

    Ok(Json(state.recipe_command.get(&auth.user_id, &id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.recipe_command.delete(&auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct FavoriteInput {
    pub is_favorite: bool,
}

pub async fn favorite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<FavoriteInput>,
) -> Result<Json<RecipeView>> {
    state
        .recipe_command
        .set_favorite(&auth.user_id, &id, input.is_favorite)
        .await?;

    Ok(Json(state.recipe_command.get(&auth.user_id, &id).await?))
}

pub async fn ratings(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<RatingSummary>> {
    Ok(Json(state.recipe_command.ratings(&auth.user_id, &id).await?))
}

pub async fn rate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<RateInput>,
) -> Result<Json<RatingSummary>> {
    Ok(Json(
        state.recipe_command.rate(&auth.user_id, &id, input).await?,
    ))
}

pub async fn unrate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state.recipe_command.unrate(&auth.user_id, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize, Default, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

pub async fn export(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let response = match query.format {
        ExportFormat::Json => Json(state.recipe_command.export_json(&auth.user_id).await?)
            .into_response(),
        ExportFormat::Csv => {
            let body = state.recipe_command.export_csv(&auth.user_id).await?;
            (
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                    (
                        header::CONTENT_DISPOSITION,
                        "attachment; filename=\"recipes.csv\"",
                    ),
                ],
                body,
            )
                .into_response()
        }
    };

    Ok(response)
}

fn is_csv(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("text/csv"))
}

/// Accepts a JSON array of recipes, or a CSV document when sent as `text/csv`.
pub async fn import(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ImportReport>> {
    let report = if is_csv(&headers) {
        let text = std::str::from_utf8(&body)
            .map_err(|_| AppError::bad_request("CSV body must be valid UTF-8"))?;
        state.recipe_command.import_csv(&auth.user_id, text).await?
    } else {
        let recipes: Vec<serde_json::Value> = serde_json::from_slice(&body).map_err(|err| {
            AppError::bad_request(format!("expected a JSON array of recipes: {err}"))
        })?;
        state
            .recipe_command
            .import_json(&auth.user_id, recipes)
            .await?
    };

    Ok(Json(report))
}

#[derive(Deserialize)]
pub struct ImportUrlInput {
    pub url: String,
}

pub async fn import_url(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<ImportUrlInput>,
) -> Result<impl IntoResponse> {
    let id = state
        .recipe_command
        .import_url(&auth.user_id, &state.importer, &input.url)
        .await?;
    let recipe = state.recipe_command.get(&auth.user_id, &id).await?;

    Ok((StatusCode::CREATED, Json(recipe)))
}
