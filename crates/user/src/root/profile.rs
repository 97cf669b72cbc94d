use serde::Deserialize;
use validator::Validate;

use crate::repository::{self, UserRow};

#[derive(Validate, Deserialize, Default)]
pub struct UpdateProfileInput {
    #[validate(length(max = 100))]
    pub full_name: Option<String>,
    #[validate(range(min = 1, max = 20))]
    pub household_size: Option<i64>,
}

#[derive(Validate, Deserialize)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 64))]
    pub new_password: String,
}

impl super::Command {
    pub async fn update_profile(
        &self,
        id: impl Into<String>,
        input: UpdateProfileInput,
    ) -> mealmate_shared::Result<UserRow> {
        input.validate()?;

        let id = id.into();
        let full_name = input.full_name.map(|name| {
            let name = name.trim().to_owned();
            if name.is_empty() { None } else { Some(name) }
        });

        let updated = repository::update(
            &self.write_db,
            repository::UpdateInput {
                id: id.to_owned(),
                full_name,
                household_size: input.household_size,
                ..Default::default()
            },
        )
        .await?;

        if !updated {
            mealmate_shared::not_found!("user");
        }

        self.load(id).await
    }

    pub async fn change_password(
        &self,
        id: impl Into<String>,
        input: ChangePasswordInput,
    ) -> mealmate_shared::Result<()> {
        input.validate()?;

        let user = self.load(id).await?;

        if !crate::verify_password(&input.current_password, &user.password)? {
            mealmate_shared::user!("Current password is incorrect");
        }

        if input.current_password == input.new_password {
            mealmate_shared::user!("New password must be different from the current one");
        }

        let password_hash = crate::hash_password(&input.new_password)?;

        repository::update(
            &self.write_db,
            repository::UpdateInput {
                id: user.id.to_owned(),
                password: Some(password_hash),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, "password changed");

        Ok(())
    }

    /// Removes the account, owned rows go with it through foreign keys.
    pub async fn delete(&self, id: impl Into<String>) -> mealmate_shared::Result<()> {
        let id = id.into();

        if !repository::delete(&self.write_db, &id).await? {
            mealmate_shared::not_found!("user");
        }

        tracing::info!(user_id = %id, "user deleted");

        Ok(())
    }
}
