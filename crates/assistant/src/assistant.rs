use std::{fmt::Write, str::FromStr, sync::Arc};

use mealmate_recipe::{RecipeInput, parse_ingredient_line};
use mealmate_shared::recipe::{MealType, RecipeIngredient, RecipeSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    Completion, CompletionProvider, CompletionRequest, HouseholdContext, Message, Priority,
    QueueError, RequestQueue,
    parse::{as_i64, as_string, as_strings, extract_json, find_list, parse_error},
    prompt,
};

pub const NOT_CONFIGURED: &str = "AI recommendations are not configured";

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct RecommendInput {
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[validate(range(min = 1, max = 5))]
    #[serde(default = "default_count")]
    pub count: u8,
    #[serde(default)]
    pub use_pantry: bool,
    #[serde(default)]
    pub family_member_ids: Vec<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_count() -> u8 {
    3
}

impl Default for RecommendInput {
    fn default() -> Self {
        Self {
            meal_type: None,
            count: default_count(),
            use_pantry: false,
            family_member_ids: Vec::new(),
            instructions: None,
        }
    }
}

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct MealPlanIdeasInput {
    #[validate(range(min = 1, max = 7))]
    #[serde(default = "default_days")]
    pub days: u8,
    #[validate(length(max = 5))]
    #[serde(default)]
    pub meal_types: Vec<MealType>,
    #[serde(default)]
    pub use_pantry: bool,
    #[serde(default)]
    pub family_member_ids: Vec<String>,
    #[validate(length(max = 500))]
    #[serde(default)]
    pub instructions: Option<String>,
}

fn default_days() -> u8 {
    7
}

impl Default for MealPlanIdeasInput {
    fn default() -> Self {
        Self {
            days: default_days(),
            meal_types: Vec::new(),
            use_pantry: false,
            family_member_ids: Vec::new(),
            instructions: None,
        }
    }
}

impl MealPlanIdeasInput {
    /// Requested meal types without duplicates, dinner when none were given.
    pub fn meal_types(&self) -> Vec<MealType> {
        let mut meal_types = self.meal_types.to_vec();
        meal_types.sort();
        meal_types.dedup();

        if meal_types.is_empty() {
            meal_types.push(MealType::Dinner);
        }

        meal_types
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RecipeSuggestion {
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub meal_type: MealType,
    pub prep_time_minutes: i64,
    pub cook_time_minutes: i64,
    pub servings: i64,
    pub ingredients: Vec<RecipeIngredient>,
    pub instructions: Vec<String>,
    pub tags: Vec<String>,
}

impl RecipeSuggestion {
    fn from_value(value: &Value, meal_type: MealType, servings: i64) -> Option<Self> {
        let name = value.get("name").or_else(|| value.get("title")).and_then(as_string)?;

        let ingredients = value
            .get("ingredients")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(ingredient_from_value).collect())
            .unwrap_or_default();

        let minutes = |key: &str| {
            value
                .get(key)
                .and_then(as_i64)
                .unwrap_or_default()
                .clamp(0, 1440)
        };

        Some(Self {
            name: name.chars().take(120).collect(),
            description: value.get("description").and_then(as_string),
            cuisine: value.get("cuisine").and_then(as_string),
            meal_type: value
                .get("meal_type")
                .and_then(Value::as_str)
                .and_then(parse_meal_type)
                .unwrap_or(meal_type),
            prep_time_minutes: minutes("prep_time_minutes"),
            cook_time_minutes: minutes("cook_time_minutes"),
            servings: value
                .get("servings")
                .and_then(as_i64)
                .unwrap_or(servings)
                .clamp(1, 50),
            ingredients,
            instructions: value
                .get("instructions")
                .or_else(|| value.get("steps"))
                .map(as_strings)
                .unwrap_or_default(),
            tags: value.get("tags").map(as_strings).unwrap_or_default(),
        })
    }

    /// Shape accepted by `POST /recipes`, marked as AI generated.
    pub fn into_recipe_input(self) -> RecipeInput {
        RecipeInput {
            name: self.name,
            description: self.description,
            cuisine: self.cuisine,
            meal_type: self.meal_type,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            ingredients: self.ingredients,
            instructions: self.instructions,
            tags: self.tags,
            source: RecipeSource::Ai,
            source_url: None,
            is_favorite: false,
        }
    }
}

fn ingredient_from_value(value: &Value) -> Option<RecipeIngredient> {
    if let Value::String(line) = value {
        let ingredient = parse_ingredient_line(line);
        return Some(ingredient).filter(|i| !i.name.is_empty());
    }

    let name = value.get("name").and_then(as_string)?;
    let quantity = value.get("quantity").and_then(as_string);
    let unit = value.get("unit").and_then(as_string);

    let line = [quantity, unit, Some(name.to_owned())]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut ingredient = parse_ingredient_line(&line);
    if ingredient.name.is_empty() {
        ingredient.name = name;
    }
    if let Some(note) = value.get("note").and_then(as_string) {
        ingredient.note = Some(note);
    }

    Some(ingredient)
}

fn parse_meal_type(value: &str) -> Option<MealType> {
    MealType::from_str(&value.trim().to_lowercase()).ok()
}

#[derive(Serialize, Clone, Debug)]
pub struct Recommendation {
    pub model: String,
    pub recipes: Vec<RecipeSuggestion>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct MealIdea {
    pub meal_type: MealType,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct DayIdeas {
    pub day: u32,
    pub meals: Vec<MealIdea>,
}

#[derive(Serialize, Clone, Debug)]
pub struct MealPlanIdeas {
    pub model: String,
    pub days: Vec<DayIdeas>,
    /// Plain text rendering of `days`.
    pub text: String,
}

fn parse_days(value: &Value, input: &MealPlanIdeasInput) -> Vec<DayIdeas> {
    let Some(days) = find_list(value, &["days", "plan", "meal_plan"]) else {
        return Vec::new();
    };

    let meal_types = input.meal_types();
    let mut parsed = days
        .iter()
        .enumerate()
        .filter_map(|(index, day)| {
            let number = day
                .get("day")
                .and_then(as_i64)
                .and_then(|d| u32::try_from(d).ok())
                .unwrap_or(index as u32 + 1);

            let meals = find_list(day, &["meals"])?
                .iter()
                .enumerate()
                .filter_map(|(pos, meal)| {
                    Some(MealIdea {
                        name: meal.get("name").and_then(as_string)?,
                        meal_type: meal
                            .get("meal_type")
                            .and_then(Value::as_str)
                            .and_then(parse_meal_type)
                            .unwrap_or(meal_types[pos % meal_types.len()]),
                        description: meal.get("description").and_then(as_string),
                    })
                })
                .collect::<Vec<_>>();

            Some(DayIdeas { day: number, meals }).filter(|d| !d.meals.is_empty())
        })
        .filter(|d| d.day >= 1 && d.day <= u32::from(input.days))
        .collect::<Vec<_>>();

    parsed.sort_by_key(|d| d.day);
    parsed.dedup_by_key(|d| d.day);
    parsed
}

fn render_days(days: &[DayIdeas]) -> String {
    let mut text = String::new();
    for day in days {
        let _ = writeln!(text, "Day {}", day.day);
        for meal in &day.meals {
            let _ = write!(text, "  {}: {}", meal.meal_type, meal.name);
            if let Some(description) = &meal.description {
                let _ = write!(text, " - {description}");
            }
            text.push('\n');
        }
    }

    text
}

/// Recipe and meal plan ideas from a completion provider, rate limited by
/// the request queue.
#[derive(Clone)]
pub struct Assistant {
    provider: Option<Arc<dyn CompletionProvider>>,
    queue: RequestQueue,
}

impl Assistant {
    pub fn new(provider: Option<Arc<dyn CompletionProvider>>, queue: RequestQueue) -> Self {
        Self { provider, queue }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    async fn complete(
        &self,
        label: &str,
        priority: Priority,
        messages: Vec<Message>,
    ) -> mealmate_shared::Result<Completion> {
        let Some(provider) = self.provider.clone() else {
            return Err(mealmate_shared::Error::Unavailable(NOT_CONFIGURED.to_owned()));
        };

        let request = CompletionRequest {
            messages,
            ..Default::default()
        };

        let ticket = self.queue.enqueue(label, priority, move || async move {
            provider.complete(request).await
        });

        match ticket.wait().await {
            Ok(result) => result,
            Err(QueueError::Cancelled) => Err(mealmate_shared::Error::Unavailable(
                "AI request was cancelled".to_owned(),
            )),
            Err(QueueError::Aborted) => {
                tracing::error!(label, "AI request stopped without a result");
                mealmate_shared::server!("AI request failed");
            }
        }
    }

    #[tracing::instrument(skip_all, fields(count = input.count))]
    pub async fn recommend_recipes(
        &self,
        input: RecommendInput,
        context: &HouseholdContext,
        priority: Priority,
    ) -> mealmate_shared::Result<Recommendation> {
        input.validate()?;

        let messages = prompt::recommend_messages(&input, context);
        let completion = self.complete("recommend_recipes", priority, messages).await?;

        let value = extract_json(&completion.content).ok_or_else(parse_error)?;
        let meal_type = input.meal_type.unwrap_or_default();
        let servings = context.household_size.max(1);

        let recipes = find_list(&value, &["recipes", "recommendations", "suggestions"])
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| RecipeSuggestion::from_value(item, meal_type, servings))
                    .take(usize::from(input.count))
                    .collect::<Vec<_>>()
            })
            .or_else(|| {
                RecipeSuggestion::from_value(&value, meal_type, servings).map(|recipe| vec![recipe])
            })
            .unwrap_or_default();

        if recipes.is_empty() {
            tracing::warn!(content = %completion.content, "AI response had no usable recipes");
            return Err(parse_error());
        }

        Ok(Recommendation {
            model: completion.model,
            recipes,
        })
    }

    #[tracing::instrument(skip_all, fields(days = input.days))]
    pub async fn suggest_meal_plan(
        &self,
        input: MealPlanIdeasInput,
        context: &HouseholdContext,
        priority: Priority,
    ) -> mealmate_shared::Result<MealPlanIdeas> {
        input.validate()?;

        let messages = prompt::meal_plan_messages(&input, context);
        let completion = self.complete("suggest_meal_plan", priority, messages).await?;

        let value = extract_json(&completion.content).ok_or_else(parse_error)?;
        let days = parse_days(&value, &input);

        if days.is_empty() {
            tracing::warn!(content = %completion.content, "AI response had no usable days");
            return Err(parse_error());
        }

        Ok(MealPlanIdeas {
            model: completion.model,
            text: render_days(&days),
            days,
        })
    }
}
