use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

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
pub enum Unit {
    #[default]
    Piece,
    G,
    Kg,
    Oz,
    Lb,
    Ml,
    L,
    Tsp,
    Tbsp,
    Cup,
    Pinch,
    Clove,
    Can,
    Bunch,
    Slice,
}

impl Unit {
    /// Unit quantities are summed in, with the factor converting into it.
    ///
    /// Mass converts to grams, volume to millilitres, anything else stays
    /// in its own unit.
    pub fn base(&self) -> (Unit, f64) {
        match self {
            Unit::G => (Unit::G, 1.0),
            Unit::Kg => (Unit::G, 1000.0),
            Unit::Oz => (Unit::G, 28.35),
            Unit::Lb => (Unit::G, 453.59),
            Unit::Ml => (Unit::Ml, 1.0),
            Unit::L => (Unit::Ml, 1000.0),
            Unit::Tsp => (Unit::Ml, 5.0),
            Unit::Tbsp => (Unit::Ml, 15.0),
            Unit::Cup => (Unit::Ml, 240.0),
            other => (*other, 1.0),
        }
    }

    /// Units sharing a dimension can be summed together.
    pub fn dimension(&self) -> Unit {
        self.base().0
    }

    pub fn to_base(&self, quantity: f64) -> (Unit, f64) {
        let (unit, factor) = self.base();

        (unit, quantity * factor)
    }

    /// Lenient parsing for free text such as imported ingredient lines.
    pub fn parse_loose(value: &str) -> Option<Unit> {
        let value = value.trim().trim_end_matches('.').to_lowercase();

        let unit = match value.as_str() {
            "piece" | "pieces" | "pc" | "pcs" | "whole" | "item" | "items" => Unit::Piece,
            "g" | "gr" | "gram" | "grams" | "gramme" | "grammes" => Unit::G,
            "kg" | "kilo" | "kilos" | "kilogram" | "kilograms" => Unit::Kg,
            "oz" | "ounce" | "ounces" => Unit::Oz,
            "lb" | "lbs" | "pound" | "pounds" => Unit::Lb,
            "ml" | "milliliter" | "milliliters" | "millilitre" | "millilitres" => Unit::Ml,
            "l" | "liter" | "liters" | "litre" | "litres" => Unit::L,
            "tsp" | "teaspoon" | "teaspoons" => Unit::Tsp,
            "tbsp" | "tbs" | "tablespoon" | "tablespoons" => Unit::Tbsp,
            "cup" | "cups" => Unit::Cup,
            "pinch" | "pinches" => Unit::Pinch,
            "clove" | "cloves" => Unit::Clove,
            "can" | "cans" | "tin" | "tins" => Unit::Can,
            "bunch" | "bunches" => Unit::Bunch,
            "slice" | "slices" => Unit::Slice,
            _ => return None,
        };

        Some(unit)
    }
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
pub enum IngredientCategory {
    Produce,
    Dairy,
    Meat,
    Seafood,
    Bakery,
    Grains,
    Canned,
    Frozen,
    Spices,
    Condiments,
    Beverages,
    Snacks,
    #[default]
    Other,
}

/// Trimmed, lowercased, inner whitespace collapsed.
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
