use axum::{
    RequestExt,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{auth::AuthUser, error::AppError, routes::AppState};

/// Validates the bearer token and inserts `AuthUser` into the request
///
/// Rejected with 401 when:
/// - the header is missing or malformed
/// - the token is invalid or expired
/// - the account no longer exists
///
/// Suspended accounts get 403. The admin flag comes from the stored role,
/// so a demoted admin loses access before the token expires.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = req
        .extract_parts::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AppError::unauthorized())?;

    let claims = crate::auth::validate_token(bearer.token(), &state.config.jwt.secret)?;

    let Some(user) = state
        .user_command
        .find(mealmate_user::FindType::Id(claims.sub))
        .await?
    else {
        tracing::warn!("token for a deleted account");
        return Err(AppError::unauthorized());
    };

    if user.is_suspended() {
        tracing::warn!(user_id = %user.id, "suspended user rejected");
        return Err(AppError::forbidden());
    }

    req.extensions_mut().insert(AuthUser {
        is_admin: user.is_admin(),
        user_id: user.id,
    });

    Ok(next.run(req).await)
}
