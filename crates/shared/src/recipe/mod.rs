use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use validator::Validate;

use crate::pantry::Unit;

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    #[default]
    Dinner,
    Snack,
    Dessert,
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    #[default]
    Manual,
    Ai,
    Imported,
}

#[derive(Validate, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    #[validate(length(min = 1, max = 100), custom(function = "crate::validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[validate(length(max = 200))]
    #[serde(default)]
    pub note: Option<String>,
}

impl RecipeIngredient {
    pub fn new(name: impl Into<String>, quantity: Option<f64>, unit: Option<Unit>) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit,
            note: None,
        }
    }
}

impl std::fmt::Display for RecipeIngredient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(quantity) = self.quantity {
            write!(f, "{} ", format_quantity(quantity))?;
        }

        if let Some(unit) = self.unit {
            write!(f, "{unit} ")?;
        }

        write!(f, "{}", self.name)?;

        if let Some(note) = self.note.as_ref().filter(|n| !n.is_empty()) {
            write!(f, ", {note}")?;
        }

        Ok(())
    }
}

/// Formats a quantity with at most two decimals and no trailing zeros.
pub fn format_quantity(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }

    let formatted = format!("{rounded:.2}");
    formatted.trim_end_matches('0').to_owned()
}
