use std::{sync::LazyLock, time::Duration};

use mealmate_shared::recipe::{MealType, RecipeSource};
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::{RecipeInput, parse_ingredient_line, parse_iso_duration};

static LD_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .unwrap()
});
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Fetches a recipe page and reads its schema.org `Recipe` metadata.
#[derive(Clone)]
pub struct UrlImporter {
    client: reqwest::Client,
}

impl UrlImporter {
    pub fn new(timeout: Duration) -> mealmate_shared::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mealmate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| mealmate_shared::Error::Unknown(e.into()))?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str) -> mealmate_shared::Result<RecipeInput> {
        let Ok(parsed) = Url::parse(url.trim()) else {
            mealmate_shared::user!("Invalid recipe URL");
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            mealmate_shared::user!("Only http and https URLs can be imported");
        }

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(url = %parsed, err = %e, "recipe page fetch failed");
                mealmate_shared::Error::Unavailable("Could not reach the recipe page".to_owned())
            })?;

        let status = response.status();
        if !status.is_success() {
            mealmate_shared::user!("Recipe page answered with status {}", status.as_u16());
        }

        let html = response
            .text()
            .await
            .map_err(|e| mealmate_shared::Error::Unavailable(e.to_string()))?;

        let Some(recipe) = extract_recipe(&html, parsed.as_str()) else {
            mealmate_shared::user!("No recipe found at this URL");
        };

        Ok(recipe)
    }
}

pub(crate) fn extract_recipe(html: &str, url: &str) -> Option<RecipeInput> {
    LD_JSON
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .filter_map(|m| serde_json::from_str::<Value>(m.as_str().trim()).ok())
        .find_map(|value| find_recipe(&value).and_then(|r| map_recipe(r, url)))
}

fn is_recipe(value: &Value) -> bool {
    match value.get("@type") {
        Some(Value::String(t)) => t == "Recipe",
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some("Recipe")),
        _ => false,
    }
}

fn find_recipe(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.iter().find_map(find_recipe),
        Value::Object(object) => {
            if is_recipe(value) {
                return Some(value);
            }

            object.get("@graph").and_then(find_recipe)
        }
        _ => None,
    }
}

fn clean_text(value: &str) -> String {
    let text = TAGS.replace_all(value, " ");
    let text = text
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ");

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate(value: String, max: usize) -> String {
    if value.chars().count() <= max {
        return value;
    }

    value.chars().take(max).collect()
}

fn text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => clean_text(s),
        Value::Array(items) => return items.iter().find_map(|i| text(Some(i))),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if text.is_empty() { None } else { Some(text) }
}

fn strings(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(|i| text(Some(i))).collect(),
        Some(Value::String(s)) => vec![clean_text(s)],
        _ => vec![],
    }
}

fn instructions(value: Option<&Value>, steps: &mut Vec<String>) {
    match value {
        Some(Value::String(s)) => steps.extend(
            s.lines()
                .map(clean_text)
                .filter(|line| !line.is_empty()),
        ),
        Some(Value::Array(items)) => {
            for item in items {
                instructions(Some(item), steps);
            }
        }
        Some(object @ Value::Object(_)) => {
            if let Some(elements) = object.get("itemListElement") {
                instructions(Some(elements), steps);
            } else if let Some(step) = text(object.get("text")).or_else(|| text(object.get("name"))) {
                steps.push(step);
            }
        }
        _ => {}
    }
}

fn servings(value: Option<&Value>) -> i64 {
    let servings = match value {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::Array(items)) => return items.first().map(|i| servings(Some(i))).unwrap_or(2),
        Some(Value::String(s)) => FIRST_NUMBER.find(s).and_then(|m| m.as_str().parse().ok()),
        _ => None,
    };

    servings.unwrap_or(2).clamp(1, 50)
}

fn meal_type(category: Option<String>) -> MealType {
    let Some(category) = category.map(|c| c.to_lowercase()) else {
        return MealType::default();
    };

    if category.contains("breakfast") || category.contains("brunch") {
        MealType::Breakfast
    } else if category.contains("lunch") {
        MealType::Lunch
    } else if category.contains("dessert") {
        MealType::Dessert
    } else if category.contains("snack") || category.contains("appetizer") {
        MealType::Snack
    } else {
        MealType::Dinner
    }
}

fn map_recipe(recipe: &Value, url: &str) -> Option<RecipeInput> {
    let name = text(recipe.get("name"))?;

    let ingredients = strings(recipe.get("recipeIngredient").or_else(|| recipe.get("ingredients")))
        .iter()
        .take(100)
        .map(|line| {
            let mut ingredient = parse_ingredient_line(line);
            ingredient.name = truncate(ingredient.name, 100);
            ingredient.note = ingredient.note.map(|n| truncate(n, 200));
            ingredient
        })
        .collect::<Vec<_>>();

    let mut steps = vec![];
    instructions(recipe.get("recipeInstructions"), &mut steps);

    let minutes = |key: &str| {
        recipe
            .get(key)
            .and_then(Value::as_str)
            .and_then(parse_iso_duration)
            .map(|m| m.clamp(0, 1440))
    };
    let prep_time_minutes = minutes("prepTime").unwrap_or(0);
    let cook_time_minutes = minutes("cookTime")
        .or_else(|| minutes("totalTime").map(|total| (total - prep_time_minutes).max(0)))
        .unwrap_or(0);

    let tags = match recipe.get("keywords") {
        Some(Value::String(s)) => s
            .split(',')
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty())
            .collect(),
        other => strings(other),
    };

    Some(RecipeInput {
        name: truncate(name, 120),
        description: text(recipe.get("description")).map(|d| truncate(d, 2000)),
        cuisine: text(recipe.get("recipeCuisine")).map(|c| truncate(c, 50)),
        meal_type: meal_type(text(recipe.get("recipeCategory"))),
        prep_time_minutes,
        cook_time_minutes,
        servings: servings(recipe.get("recipeYield")),
        ingredients,
        instructions: steps.into_iter().take(100).collect(),
        tags: tags.into_iter().take(20).collect(),
        source: RecipeSource::Imported,
        source_url: Some(url.to_owned()),
        is_favorite: false,
    })
}

#[cfg(test)]
mod tests {
    use mealmate_shared::pantry::Unit;

    use super::*;

    const PAGE: &str = r#"<html><head>
        <script type="application/ld+json">{"@type": "WebSite", "name": "Blog"}</script>
        <script type="application/ld+json">
        {"@context": "https://schema.org", "@graph": [
            {"@type": "WebPage", "name": "Page"},
            {"@type": ["Recipe", "NewsArticle"],
             "name": "Tomato &amp; Basil Soup",
             "description": "<p>A warm soup.</p>",
             "recipeCuisine": ["Italian"],
             "recipeCategory": "Lunch",
             "recipeYield": ["4 servings", "4"],
             "prepTime": "PT10M",
             "totalTime": "PT45M",
             "recipeIngredient": ["1 kg tomatoes, chopped", "2 tbsp olive oil", "Basil"],
             "recipeInstructions": [
                {"@type": "HowToSection", "name": "Prep", "itemListElement": [
                    {"@type": "HowToStep", "text": "Chop the tomatoes."}
                ]},
                {"@type": "HowToStep", "text": "Simmer for 30 minutes."},
                "Blend and serve."
             ],
             "keywords": "soup, vegetarian"}
        ]}
        </script></head><body></body></html>"#;

    #[test]
    fn extracts_recipe_from_graph() {
        let recipe = extract_recipe(PAGE, "https://example.org/soup").unwrap();

        assert_eq!(recipe.name, "Tomato & Basil Soup");
        assert_eq!(recipe.description.as_deref(), Some("A warm soup."));
        assert_eq!(recipe.cuisine.as_deref(), Some("Italian"));
        assert_eq!(recipe.meal_type, MealType::Lunch);
        assert_eq!(recipe.servings, 4);
        assert_eq!(recipe.prep_time_minutes, 10);
        assert_eq!(recipe.cook_time_minutes, 35);
        assert_eq!(recipe.ingredients.len(), 3);
        assert_eq!(recipe.ingredients[0].unit, Some(Unit::Kg));
        assert_eq!(recipe.ingredients[0].note.as_deref(), Some("chopped"));
        assert_eq!(recipe.ingredients[2].quantity, None);
        assert_eq!(
            recipe.instructions,
            vec!["Chop the tomatoes.", "Simmer for 30 minutes.", "Blend and serve."]
        );
        assert_eq!(recipe.tags, vec!["soup", "vegetarian"]);
        assert_eq!(recipe.source, RecipeSource::Imported);
        assert_eq!(recipe.source_url.as_deref(), Some("https://example.org/soup"));
    }

    #[test]
    fn no_recipe_on_page() {
        let html = r#"<script type="application/ld+json">{"@type": "Article"}</script>"#;

        assert!(extract_recipe(html, "https://example.org").is_none());
        assert!(extract_recipe("<html></html>", "https://example.org").is_none());
    }

    #[test]
    fn instructions_as_plain_text() {
        let html = r#"<script type='application/ld+json'>[{"@type":"Recipe","name":"Tea",
            "recipeInstructions":"Boil water.\nSteep tea.","recipeYield":2}]</script>"#;

        let recipe = extract_recipe(html, "https://example.org/tea").unwrap();
        assert_eq!(recipe.instructions, vec!["Boil water.", "Steep tea."]);
        assert_eq!(recipe.servings, 2);
    }
}
