use mealmate_shared::{
    Pagination,
    recipe::{MealType, RecipeIngredient, RecipeSource},
};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

#[derive(Validate, Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RecipeInput {
    #[validate(length(min = 1, max = 120), custom(function = "mealmate_shared::validate_not_blank"))]
    pub name: String,
    #[validate(length(max = 2000))]
    #[serde(default)]
    pub description: Option<String>,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub meal_type: MealType,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub prep_time_minutes: i64,
    #[validate(range(min = 0, max = 1440))]
    #[serde(default)]
    pub cook_time_minutes: i64,
    #[validate(range(min = 1, max = 50))]
    #[serde(default = "default_servings")]
    pub servings: i64,
    #[validate(length(min = 1, max = 100), nested)]
    pub ingredients: Vec<RecipeIngredient>,
    #[validate(length(max = 100), custom(function = "validate_steps"))]
    #[serde(default)]
    pub instructions: Vec<String>,
    #[validate(length(max = 20))]
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: RecipeSource,
    #[validate(url)]
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub is_favorite: bool,
}

fn default_servings() -> i64 {
    2
}

fn validate_steps(steps: &[String]) -> Result<(), ValidationError> {
    if steps.iter().any(|s| s.chars().count() > 2000) {
        return Err(ValidationError::new("length")
            .with_message("each step must be at most 2000 characters".into()));
    }

    Ok(())
}

impl RecipeInput {
    /// Trims free text, drops blank steps and tags, lowercases tags.
    pub(crate) fn normalized(mut self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
        }

        self.name = self.name.trim().to_owned();
        self.description = blank_to_none(self.description);
        self.cuisine = blank_to_none(self.cuisine);
        self.source_url = blank_to_none(self.source_url);
        self.instructions = self
            .instructions
            .into_iter()
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        let mut tags: Vec<String> = Vec::new();
        for tag in self.tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        self.tags = tags;

        for ingredient in self.ingredients.iter_mut() {
            ingredient.name = ingredient.name.trim().to_owned();
            ingredient.note = blank_to_none(ingredient.note.take());
        }

        self
    }
}

#[derive(Default, Clone, Debug)]
pub struct RecipeFilter {
    pub search: Option<String>,
    pub meal_type: Option<MealType>,
    pub favorite: Option<bool>,
    pub source: Option<RecipeSource>,
    pub tag: Option<String>,
    pub pagination: Pagination,
}
