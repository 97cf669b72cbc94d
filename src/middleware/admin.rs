//! Admin authorization middleware for Axum

use axum::{extract::Request, middleware::Next, response::Response};

use crate::{auth::AuthUser, error::AppError};

/// Lets the request through only for admins, runs after `auth_middleware`
pub async fn admin_middleware(request: Request, next: Next) -> Result<Response, AppError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| {
            tracing::warn!("admin middleware: no authenticated user in request extensions");
            AppError::unauthorized()
        })?;

    if !auth_user.is_admin {
        tracing::error!(
            user_id = %auth_user.user_id,
            "non-admin user attempted to access admin route"
        );
        return Err(AppError::forbidden());
    }

    Ok(next.run(request).await)
}
