use mealmate_shared::{now, user::Role};
use serde::Deserialize;
use ulid::Ulid;
use validator::Validate;

use crate::repository::{self, FindType};

#[derive(Validate, Deserialize)]
pub struct RegisterInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, max = 64))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
}

impl super::Command {
    pub async fn register(&self, input: RegisterInput) -> mealmate_shared::Result<String> {
        input.validate()?;

        if repository::find(&self.write_db, FindType::Email(input.email.to_owned()))
            .await?
            .is_some()
        {
            mealmate_shared::conflict!("Email already exists");
        }

        let password_hash = crate::hash_password(&input.password)?;
        let id = Ulid::new().to_string();

        let created = repository::create(
            &self.write_db,
            repository::CreateInput {
                id: id.to_owned(),
                email: input.email,
                password: password_hash,
                full_name: input.full_name,
                role: Role::User,
                now: now(),
            },
        )
        .await;

        // A concurrent registration can win between the lookup and the insert.
        match created {
            Err(err) if err.is_unique_violation() => {
                mealmate_shared::conflict!("Email already exists")
            }
            other => other?,
        }

        tracing::info!(user_id = %id, "user registered");

        Ok(id)
    }
}
