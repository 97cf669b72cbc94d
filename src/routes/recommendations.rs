use axum::{Extension, Json, extract::State};
use mealmate_assistant::{
    HouseholdContext, MealPlanIdeas, MealPlanIdeasInput, Priority, RecommendInput, Recommendation,
};
use mealmate_pantry::PantryFilter;

use super::AppState;
use crate::{auth::AuthUser, error::Result};

async fn household(
    state: &AppState,
    auth: &AuthUser,
    member_ids: &[String],
    use_pantry: bool,
) -> Result<HouseholdContext> {
    let user = state.user_command.profile(&auth.user_id).await?;
    let members = state
        .family_command
        .household_profile(&auth.user_id, member_ids)
        .await?;
    let pantry = if use_pantry {
        state
            .pantry_command
            .list(&auth.user_id, PantryFilter::default())
            .await?
    } else {
        Vec::new()
    };

    Ok(HouseholdContext::new(user.household_size, &members, &pantry))
}

fn priority(auth: &AuthUser) -> Priority {
    if auth.is_admin {
        Priority::High
    } else {
        Priority::Normal
    }
}

pub async fn recipes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<RecommendInput>,
) -> Result<Json<Recommendation>> {
    let context = household(&state, &auth, &input.family_member_ids, input.use_pantry).await?;
    let recommendation = state
        .assistant
        .recommend_recipes(input, &context, priority(&auth))
        .await?;

    Ok(Json(recommendation))
}

pub async fn meal_plan(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<MealPlanIdeasInput>,
) -> Result<Json<MealPlanIdeas>> {
    let context = household(&state, &auth, &input.family_member_ids, input.use_pantry).await?;
    let ideas = state
        .assistant
        .suggest_meal_plan(input, &context, priority(&auth))
        .await?;

    Ok(Json(ideas))
}
