use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use mealmate_assistant::Assistant;
use mealmate_recipe::UrlImporter;
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::middleware::{admin_middleware, auth_middleware};

mod admin;
mod auth;
mod family;
mod health;
mod meal_plans;
mod pantry;
mod recipes;
mod recommendations;

const URL_IMPORT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<crate::config::Config>,
    pub pool: SqlitePool,
    pub user_command: mealmate_user::Command,
    pub family_command: mealmate_family::Command,
    pub pantry_command: mealmate_pantry::Command,
    pub recipe_command: mealmate_recipe::Command,
    pub mealplan_command: mealmate_mealplan::Command,
    pub assistant: Assistant,
    pub importer: Arc<UrlImporter>,
}

impl AppState {
    pub fn new(
        config: crate::config::Config,
        state: mealmate_shared::State,
        assistant: Assistant,
    ) -> mealmate_shared::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            pool: state.read_db.clone(),
            user_command: mealmate_user::Command::new(state.clone()),
            family_command: mealmate_family::Command::new(state.clone()),
            pantry_command: mealmate_pantry::Command::new(state.clone()),
            recipe_command: mealmate_recipe::Command::new(state.clone()),
            mealplan_command: mealmate_mealplan::Command::new(state),
            assistant,
            importer: Arc::new(UrlImporter::new(URL_IMPORT_TIMEOUT)?),
        })
    }

    pub(crate) fn token_for(&self, user: &mealmate_user::UserRow) -> mealmate_shared::Result<String> {
        crate::auth::generate_token(
            user.id.to_owned(),
            user.is_admin(),
            &self.config.jwt.secret,
            self.config.jwt.lifetime_seconds(),
        )
    }
}

/// `?page=&limit=` shared by paginated lists.
#[derive(Deserialize, Default)]
pub(crate) struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageQuery {
    pub fn pagination(&self) -> mealmate_shared::Pagination {
        mealmate_shared::Pagination::new(self.page, self.limit)
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    layer.allow_origin(AllowOrigin::list(origins))
}

pub fn router(app_state: AppState) -> Router {
    let public = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login));

    let protected = Router::new()
        .route(
            "/auth/me",
            get(auth::me).put(auth::update_me).delete(auth::delete_me),
        )
        .route("/auth/password", put(auth::change_password))
        .route("/family", get(family::list).post(family::create))
        .route(
            "/family/{id}",
            get(family::get).put(family::update).delete(family::delete),
        )
        .route("/ingredients", get(pantry::ingredients))
        .route("/pantry", get(pantry::list).post(pantry::add))
        .route("/pantry/expiring", get(pantry::expiring))
        .route(
            "/pantry/{id}",
            get(pantry::get).put(pantry::update).delete(pantry::remove),
        )
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route("/recipes/export", get(recipes::export))
        .route("/recipes/import", post(recipes::import))
        .route("/recipes/import-url", post(recipes::import_url))
        .route(
            "/recipes/{id}",
            get(recipes::get).put(recipes::update).delete(recipes::delete),
        )
        .route("/recipes/{id}/favorite", put(recipes::favorite))
        .route(
            "/recipes/{id}/rating",
            get(recipes::ratings).put(recipes::rate).delete(recipes::unrate),
        )
        .route("/meal-plans", get(meal_plans::list).post(meal_plans::create))
        .route(
            "/meal-plans/{id}",
            get(meal_plans::get)
                .put(meal_plans::update)
                .delete(meal_plans::delete),
        )
        .route("/meal-plans/{id}/entries", post(meal_plans::add_entry))
        .route(
            "/meal-plans/{id}/entries/{entry_id}",
            put(meal_plans::update_entry).delete(meal_plans::remove_entry),
        )
        .route(
            "/meal-plans/{id}/shopping-list",
            get(meal_plans::shopping_list),
        )
        .route("/recommendations/recipes", post(recommendations::recipes))
        .route("/recommendations/meal-plan", post(recommendations::meal_plan))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let admin = Router::new()
        .route("/admin/stats", get(admin::stats))
        .route("/admin/users", get(admin::users))
        .route(
            "/admin/users/{id}",
            get(admin::user).delete(admin::delete_user),
        )
        .route("/admin/users/{id}/suspend", post(admin::suspend))
        .route("/admin/users/{id}/activate", post(admin::activate))
        .route("/admin/users/{id}/role", put(admin::set_role))
        .route("/admin/ai/requests", get(admin::ai_requests))
        .route("/admin/ai/requests/{id}", delete(admin::cancel_ai_request))
        .route_layer(from_fn(admin_middleware))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    let cors = cors_layer(&app_state.config.server.cors_origins);

    Router::new()
        .nest("/api/v1", public.merge(protected).merge(admin))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

