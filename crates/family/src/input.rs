use std::collections::HashSet;

use mealmate_shared::family::DietaryPreference;
use serde::Deserialize;
use validator::{Validate, ValidationError};

pub const MAX_TAGS: usize = 30;

#[derive(Validate, Deserialize, Clone, Debug, Default)]
pub struct MemberInput {
    #[validate(length(min = 1, max = 50), custom(function = "mealmate_shared::validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 0, max = 120))]
    pub age: Option<i64>,
    #[serde(default)]
    pub dietary_preferences: Vec<DietaryPreference>,
    #[validate(custom(function = "validate_tags"))]
    #[serde(default)]
    pub allergies: Vec<String>,
    #[validate(custom(function = "validate_tags"))]
    #[serde(default)]
    pub dislikes: Vec<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

fn validate_tags(values: &[String]) -> Result<(), ValidationError> {
    let cleaned = clean_list(values);
    if cleaned.len() > MAX_TAGS {
        return Err(ValidationError::new("too_many")
            .with_message(format!("at most {MAX_TAGS} entries are allowed").into()));
    }

    if cleaned.iter().any(|v| v.chars().count() > 50) {
        return Err(ValidationError::new("length")
            .with_message("entries must be at most 50 characters".into()));
    }

    Ok(())
}

/// Trims entries, drops empty ones and removes case-insensitive duplicates,
/// keeping the first spelling.
pub fn clean_list(values: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();

    values
        .iter()
        .map(|v| v.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|v| !v.is_empty())
        .filter(|v| seen.insert(v.to_lowercase()))
        .collect()
}

impl MemberInput {
    pub(crate) fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_owned();
        self.allergies = clean_list(&self.allergies);
        self.dislikes = clean_list(&self.dislikes);
        self.dietary_preferences.sort();
        self.dietary_preferences.dedup();
        self.notes = self
            .notes
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleans_lists() {
        let values = vec![
            " Peanuts ".to_owned(),
            "".to_owned(),
            "peanuts".to_owned(),
            "shell   fish".to_owned(),
        ];

        assert_eq!(clean_list(&values), vec!["Peanuts", "shell fish"]);
    }

    #[test]
    fn normalizes_member() {
        let input = MemberInput {
            name: "  Emma ".to_owned(),
            dietary_preferences: vec![
                DietaryPreference::Vegan,
                DietaryPreference::GlutenFree,
                DietaryPreference::Vegan,
            ],
            notes: Some("   ".to_owned()),
            ..Default::default()
        }
        .normalized();

        assert_eq!(input.name, "Emma");
        assert_eq!(
            input.dietary_preferences,
            vec![DietaryPreference::Vegan, DietaryPreference::GlutenFree]
        );
        assert_eq!(input.notes, None);
    }

    #[test]
    fn rejects_too_many_allergies() {
        let input = MemberInput {
            name: "Leo".to_owned(),
            allergies: (0..31).map(|i| format!("allergen {i}")).collect(),
            ..Default::default()
        };

        assert!(input.validate().is_err());
    }
}
