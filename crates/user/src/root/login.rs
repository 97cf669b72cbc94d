use serde::Deserialize;
use validator::Validate;

use crate::repository::{FindType, UserRow};

#[derive(Validate, Deserialize)]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl super::Command {
    pub async fn login(&self, input: LoginInput) -> mealmate_shared::Result<UserRow> {
        input.validate()?;

        let Some(user) = self.find(FindType::Email(input.email)).await? else {
            mealmate_shared::user!("Invalid email or password");
        };

        if !crate::verify_password(&input.password, &user.password)? {
            mealmate_shared::user!("Invalid email or password");
        }

        if user.is_suspended() {
            tracing::warn!(user_id = %user.id, "suspended user attempted to login");
            mealmate_shared::forbidden!();
        }

        Ok(user)
    }
}
