mod helpers;

use axum::http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn register_then_login() -> anyhow::Result<()> {
    let app = helpers::setup().await?;

    let (token, id) = app.register("john").await?;
    assert!(!token.is_empty());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "John@Mealmate.localhost", "password": helpers::PASSWORD})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], id);
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password").is_none());

    let (status, body) = app.get("/api/v1/auth/me", body["token"].as_str().unwrap()).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "john@mealmate.localhost");

    Ok(())
}

#[tokio::test]
async fn register_rejects_duplicates_and_bad_input() -> anyhow::Result<()> {
    let app = helpers::setup().await?;
    app.register("john").await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "john@mealmate.localhost", "password": "another_password"})),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "conflict");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/register",
            None,
            Some(json!({"email": "not-an-email", "password": "short"})),
        )
        .await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "validation_error");
    assert!(body["error"]["fields"]["email"].is_array());
    assert!(body["error"]["fields"]["password"].is_array());

    Ok(())
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() -> anyhow::Result<()> {
    let app = helpers::setup().await?;
    app.register("john").await?;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "john@mealmate.localhost", "password": "wrong_password"})),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid email or password");

    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() -> anyhow::Result<()> {
    let app = helpers::setup().await?;

    let (status, body) = app.send(Method::GET, "/api/v1/recipes", None, None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthorized");

    let (status, _) = app.get("/api/v1/recipes", "not.a.token").await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn profile_update_and_password_change() -> anyhow::Result<()> {
    let app = helpers::setup().await?;
    let (token, _) = app.register("john").await?;

    let (status, body) = app
        .put(
            "/api/v1/auth/me",
            &token,
            json!({"full_name": "John Doe", "household_size": 4}),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["full_name"], "John Doe");
    assert_eq!(body["household_size"], 4);

    let (status, _) = app
        .put(
            "/api/v1/auth/password",
            &token,
            json!({"current_password": "wrong_password", "new_password": "new_password"}),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .put(
            "/api/v1/auth/password",
            &token,
            json!({"current_password": helpers::PASSWORD, "new_password": "new_password"}),
        )
        .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .send(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({"email": "john@mealmate.localhost", "password": "new_password"})),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deleted_account_token_stops_working() -> anyhow::Result<()> {
    let app = helpers::setup().await?;
    let (token, _) = app.register("john").await?;

    let (status, _) = app.delete("/api/v1/auth/me", &token).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get("/api/v1/auth/me", &token).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn health_endpoints_are_public() -> anyhow::Result<()> {
    let app = helpers::setup().await?;

    let (status, _) = app.send(Method::GET, "/api/v1/health", None, None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.send(Method::GET, "/api/v1/ready", None, None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}
