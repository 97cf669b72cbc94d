use mealmate_shared::recipe::{MealType, RecipeSource};
use serde::{Deserialize, Serialize};

use crate::{RecipeInput, parse_ingredient_line};

pub const CSV_HEADERS: [&str; 12] = [
    "name",
    "description",
    "cuisine",
    "meal_type",
    "prep_time_minutes",
    "cook_time_minutes",
    "servings",
    "ingredients",
    "instructions",
    "tags",
    "source_url",
    "is_favorite",
];

#[derive(Serialize, Deserialize, Debug, Default)]
struct CsvRecord {
    name: String,
    description: Option<String>,
    cuisine: Option<String>,
    meal_type: Option<String>,
    prep_time_minutes: Option<String>,
    cook_time_minutes: Option<String>,
    servings: Option<String>,
    ingredients: Option<String>,
    instructions: Option<String>,
    tags: Option<String>,
    source_url: Option<String>,
    is_favorite: Option<String>,
}

fn split(value: Option<String>, separator: char) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(separator)
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

fn number(field: &str, value: Option<String>, default: i64) -> Result<i64, String> {
    match value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(v) => v
            .parse::<i64>()
            .map_err(|_| format!("{field}: '{v}' is not a whole number")),
    }
}

impl TryFrom<CsvRecord> for RecipeInput {
    type Error = String;

    fn try_from(record: CsvRecord) -> Result<Self, Self::Error> {
        let meal_type = match record.meal_type.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => MealType::default(),
            Some(v) => v
                .to_lowercase()
                .parse::<MealType>()
                .map_err(|_| format!("meal_type: unknown value '{v}'"))?,
        };

        let is_favorite = matches!(
            record
                .is_favorite
                .as_deref()
                .map(|v| v.trim().to_lowercase())
                .as_deref(),
            Some("true" | "yes" | "1" | "y")
        );

        Ok(RecipeInput {
            name: record.name,
            description: record.description,
            cuisine: record.cuisine,
            meal_type,
            prep_time_minutes: number("prep_time_minutes", record.prep_time_minutes, 0)?,
            cook_time_minutes: number("cook_time_minutes", record.cook_time_minutes, 0)?,
            servings: number("servings", record.servings, 2)?,
            ingredients: split(record.ingredients, ';')
                .iter()
                .map(|line| parse_ingredient_line(line))
                .collect(),
            instructions: split(record.instructions, '|'),
            tags: split(record.tags, ','),
            source: RecipeSource::Imported,
            source_url: record.source_url,
            is_favorite,
        })
    }
}

impl From<&RecipeInput> for CsvRecord {
    fn from(recipe: &RecipeInput) -> Self {
        fn non_empty(value: String) -> Option<String> {
            if value.is_empty() { None } else { Some(value) }
        }

        CsvRecord {
            name: recipe.name.to_owned(),
            description: recipe.description.to_owned(),
            cuisine: recipe.cuisine.to_owned(),
            meal_type: Some(recipe.meal_type.to_string()),
            prep_time_minutes: Some(recipe.prep_time_minutes.to_string()),
            cook_time_minutes: Some(recipe.cook_time_minutes.to_string()),
            servings: Some(recipe.servings.to_string()),
            ingredients: non_empty(
                recipe
                    .ingredients
                    .iter()
                    .map(|i| i.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            instructions: non_empty(recipe.instructions.join(" | ")),
            tags: non_empty(recipe.tags.join(", ")),
            source_url: recipe.source_url.to_owned(),
            is_favorite: Some(recipe.is_favorite.to_string()),
        }
    }
}

pub(crate) fn write_csv(recipes: &[RecipeInput]) -> mealmate_shared::Result<String> {
    let mut writer = ::csv::Writer::from_writer(vec![]);

    if recipes.is_empty() {
        writer
            .write_record(CSV_HEADERS)
            .map_err(|e| mealmate_shared::Error::Unknown(e.into()))?;
    }

    for recipe in recipes {
        writer
            .serialize(CsvRecord::from(recipe))
            .map_err(|e| mealmate_shared::Error::Unknown(e.into()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| mealmate_shared::Error::Server(e.to_string()))?;

    String::from_utf8(bytes).map_err(|e| mealmate_shared::Error::Unknown(e.into()))
}

/// Parses every row, keeping per-row failures instead of aborting.
pub(crate) fn read_csv(text: &str) -> Vec<(usize, Result<RecipeInput, String>)> {
    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    reader
        .deserialize::<CsvRecord>()
        .enumerate()
        .map(|(index, record)| {
            let parsed = record
                .map_err(|e| match e.kind() {
                    ::csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
                    _ => e.to_string(),
                })
                .and_then(RecipeInput::try_from);

            (index + 1, parsed)
        })
        .collect()
}
