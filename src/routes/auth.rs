use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use mealmate_user::{ChangePasswordInput, LoginInput, RegisterInput, UpdateProfileInput, UserView};
use serde::Serialize;

use super::AppState;
use crate::{auth::AuthUser, error::Result};

#[derive(Serialize)]
pub struct Session {
    pub token: String,
    pub user: UserView,
}

pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<impl IntoResponse> {
    let id = state.user_command.register(input).await?;
    let user = state.user_command.load(id).await?;
    let token = state.token_for(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(Session {
            token,
            user: user.view(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> Result<Json<Session>> {
    let user = state.user_command.login(input).await?;
    let token = state.token_for(&user)?;

    tracing::info!(user_id = %user.id, "user logged in");

    Ok(Json(Session {
        token,
        user: user.view(),
    }))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserView>> {
    let user = state.user_command.profile(auth.user_id).await?;

    Ok(Json(user.view()))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<UserView>> {
    let user = state.user_command.update_profile(auth.user_id, input).await?;

    Ok(Json(user.view()))
}

pub async fn delete_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode> {
    state.user_command.delete(auth.user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<ChangePasswordInput>,
) -> Result<StatusCode> {
    state.user_command.change_password(auth.user_id, input).await?;

    Ok(StatusCode::NO_CONTENT)
}
