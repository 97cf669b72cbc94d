use std::fmt::Write;

use mealmate_family::MemberRow;
use mealmate_pantry::PantryItemRow;
use mealmate_shared::{family::DietaryPreference, recipe::format_quantity};
use serde::Serialize;

use crate::{MealPlanIdeasInput, Message, RecommendInput};

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct MemberProfile {
    pub name: String,
    pub age: Option<i64>,
    pub dietary_preferences: Vec<DietaryPreference>,
    pub allergies: Vec<String>,
    pub dislikes: Vec<String>,
}

impl From<&MemberRow> for MemberProfile {
    fn from(row: &MemberRow) -> Self {
        Self {
            name: row.name.to_owned(),
            age: row.age,
            dietary_preferences: row.dietary_preferences.0.to_vec(),
            allergies: row.allergies.0.to_vec(),
            dislikes: row.dislikes.0.to_vec(),
        }
    }
}

/// What the model is told about the household asking for ideas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HouseholdContext {
    pub household_size: i64,
    pub members: Vec<MemberProfile>,
    /// Pantry lines such as `"rice (500 g)"`; empty when pantry use is off.
    pub pantry: Vec<String>,
}

impl HouseholdContext {
    pub fn new(household_size: i64, members: &[MemberRow], pantry: &[PantryItemRow]) -> Self {
        Self {
            household_size,
            members: members.iter().map(MemberProfile::from).collect(),
            pantry: pantry
                .iter()
                .filter(|item| !item.is_out())
                .map(|item| {
                    format!(
                        "{} ({} {})",
                        item.name,
                        format_quantity(item.quantity),
                        item.unit.0
                    )
                })
                .collect(),
        }
    }

    fn allergies(&self) -> Vec<&str> {
        let mut allergies: Vec<&str> = Vec::new();
        for allergy in self.members.iter().flat_map(|m| m.allergies.iter()) {
            if !allergies.iter().any(|a| a.eq_ignore_ascii_case(allergy)) {
                allergies.push(allergy);
            }
        }

        allergies
    }

    fn describe(&self, out: &mut String, use_pantry: bool) {
        let _ = writeln!(out, "Household size: {}", self.household_size.max(1));

        if self.members.is_empty() {
            out.push_str("No family member profiles were provided.\n");
        } else {
            out.push_str("Family members:\n");
            for member in &self.members {
                let _ = write!(out, "- {}", member.name);
                if let Some(age) = member.age {
                    let _ = write!(out, ", age {age}");
                }
                if !member.dietary_preferences.is_empty() {
                    let prefs = member
                        .dietary_preferences
                        .iter()
                        .map(|p| p.to_string())
                        .collect::<Vec<_>>();
                    let _ = write!(out, "; diet: {}", prefs.join(", "));
                }
                if !member.allergies.is_empty() {
                    let _ = write!(out, "; allergic to: {}", member.allergies.join(", "));
                }
                if !member.dislikes.is_empty() {
                    let _ = write!(out, "; dislikes: {}", member.dislikes.join(", "));
                }
                out.push('\n');
            }
        }

        let allergies = self.allergies();
        if !allergies.is_empty() {
            let _ = writeln!(
                out,
                "STRICT REQUIREMENT: no dish may contain any of these allergens or ingredients derived from them: {}.",
                allergies.join(", ")
            );
        }

        if use_pantry {
            if self.pantry.is_empty() {
                out.push_str("The pantry is empty.\n");
            } else {
                let _ = writeln!(
                    out,
                    "Prefer ingredients already in the pantry: {}.",
                    self.pantry.join(", ")
                );
            }
        }
    }
}

const SYSTEM_PROMPT: &str = "You are a helpful meal planning assistant for families. \
You always respect dietary restrictions and never include ingredients a household member is allergic to. \
Reply with JSON only, without commentary.";

pub(crate) fn recommend_messages(input: &RecommendInput, context: &HouseholdContext) -> Vec<Message> {
    let mut prompt = String::new();
    let _ = write!(prompt, "Suggest {} recipe", input.count);
    if input.count > 1 {
        prompt.push('s');
    }
    if let Some(meal_type) = input.meal_type {
        let _ = write!(prompt, " for {meal_type}");
    }
    prompt.push_str(".\n");

    context.describe(&mut prompt, input.use_pantry);

    if let Some(instructions) = input.instructions.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let _ = writeln!(prompt, "Additional instructions: {instructions}");
    }

    prompt.push_str(
        "Respond with a JSON array. Each element is an object with keys: \
name, description, cuisine, meal_type (breakfast, lunch, dinner, snack or dessert), \
prep_time_minutes, cook_time_minutes, servings, \
ingredients (array of {name, quantity, unit}), instructions (array of steps), tags (array).",
    );

    vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}

pub(crate) fn meal_plan_messages(input: &MealPlanIdeasInput, context: &HouseholdContext) -> Vec<Message> {
    let meal_types = input
        .meal_types()
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>();

    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Plan {} day{} of meals covering: {}.",
        input.days,
        if input.days > 1 { "s" } else { "" },
        meal_types.join(", ")
    );

    context.describe(&mut prompt, input.use_pantry);

    if let Some(instructions) = input.instructions.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let _ = writeln!(prompt, "Additional instructions: {instructions}");
    }

    prompt.push_str(
        "Vary the dishes across days. Respond with a JSON object {\"days\": [...]} where each day is \
{\"day\": number starting at 1, \"meals\": [{\"meal_type\", \"name\", \"description\"}]}.",
    );

    vec![Message::system(SYSTEM_PROMPT), Message::user(prompt)]
}
