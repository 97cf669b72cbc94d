use serde::{Serialize, Serializer};
use sqlx::types::Text;
use validator::ValidationError;

/// Writes a `Text<T>` column as its inner value.
pub fn serialize_text<T, S>(value: &Text<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    value.0.serialize(serializer)
}

/// Rejects names that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::recipe::MealType;

    use super::*;

    #[derive(Serialize)]
    struct Row {
        #[serde(serialize_with = "serialize_text")]
        meal_type: Text<MealType>,
    }

    #[test]
    fn text_columns_serialize_as_inner_value() {
        let row = Row {
            meal_type: Text(MealType::Dinner),
        };

        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({"meal_type": "dinner"})
        );
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_not_blank("Pasta").is_ok());
        assert!(validate_not_blank(" a ").is_ok());
        assert!(validate_not_blank("").is_err());
        assert!(validate_not_blank("   \t").is_err());
    }
}
