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
pub enum DietaryPreference {
    Vegetarian,
    Vegan,
    Pescatarian,
    GlutenFree,
    DairyFree,
    NutFree,
    EggFree,
    Halal,
    Kosher,
    LowCarb,
    Keto,
    LowSodium,
}

impl DietaryPreference {
    /// Human readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            DietaryPreference::Vegetarian => "vegetarian",
            DietaryPreference::Vegan => "vegan",
            DietaryPreference::Pescatarian => "pescatarian",
            DietaryPreference::GlutenFree => "gluten-free",
            DietaryPreference::DairyFree => "dairy-free",
            DietaryPreference::NutFree => "nut-free",
            DietaryPreference::EggFree => "egg-free",
            DietaryPreference::Halal => "halal",
            DietaryPreference::Kosher => "kosher",
            DietaryPreference::LowCarb => "low-carb",
            DietaryPreference::Keto => "keto",
            DietaryPreference::LowSodium => "low-sodium",
        }
    }
}
