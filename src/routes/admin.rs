use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use mealmate_assistant::{JobId, QueueSnapshot};
use mealmate_shared::{
    Page, Pagination,
    user::{Role, State as UserState},
};
use mealmate_user::{AdminFilter, GlobalStat, UserView};
use serde::Deserialize;

use super::AppState;
use crate::{
    auth::AuthUser,
    error::{AppError, Result},
};

pub async fn stats(State(state): State<AppState>) -> Result<Json<GlobalStat>> {
    let stats = mealmate_user::global_stats(&state.pool, mealmate_shared::now()).await?;

    Ok(Json(stats))
}

#[derive(Deserialize, Default)]
pub struct UsersQuery {
    pub role: Option<Role>,
    pub state: Option<UserState>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub async fn users(
    State(state): State<AppState>,
    Query(query): Query<UsersQuery>,
) -> Result<Json<Page<UserView>>> {
    let page = mealmate_user::filter(
        &state.pool,
        AdminFilter {
            role: query.role,
            state: query.state,
            search: query.search,
            pagination: Pagination::new(query.page, query.limit),
        },
    )
    .await?;

    Ok(Json(page.map(|user| user.view())))
}

pub async fn user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    Ok(Json(state.user_command.profile(id).await?.view()))
}

fn not_self(auth: &AuthUser, id: &str, action: &str) -> Result<()> {
    if auth.user_id == id {
        return Err(AppError::bad_request(format!(
            "Admins cannot {action} their own account"
        )));
    }

    Ok(())
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    not_self(&auth, &id, "delete")?;
    state.user_command.delete(&id).await?;

    tracing::info!(admin_id = %auth.user_id, user_id = %id, "user deleted by admin");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn suspend(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    not_self(&auth, &id, "suspend")?;
    state.user_command.suspend(&id).await?;

    Ok(Json(state.user_command.load(id).await?.view()))
}

pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserView>> {
    state.user_command.activate(&id).await?;

    Ok(Json(state.user_command.load(id).await?.view()))
}

#[derive(Deserialize)]
pub struct RoleInput {
    pub role: Role,
}

pub async fn set_role(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(input): Json<RoleInput>,
) -> Result<Json<UserView>> {
    if input.role != Role::Admin {
        not_self(&auth, &id, "demote")?;
    }
    state.user_command.set_role(&id, input.role).await?;

    Ok(Json(state.user_command.load(id).await?.view()))
}

pub async fn ai_requests(State(state): State<AppState>) -> Json<QueueSnapshot> {
    Json(state.assistant.queue().snapshot())
}

/// Drops an AI request that is still waiting for a slot.
pub async fn cancel_ai_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<JobId>,
) -> Result<StatusCode> {
    if !state.assistant.queue().cancel(id) {
        return Err(mealmate_shared::Error::NotFound("pending AI request".to_owned()).into());
    }

    tracing::info!(admin_id = %auth.user_id, job = id, "AI request cancelled by admin");

    Ok(StatusCode::NO_CONTENT)
}
