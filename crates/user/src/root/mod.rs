use std::ops::Deref;

use crate::repository::{self, FindType, UserRow};

mod admin;
mod login;
mod profile;
mod register;

pub use login::LoginInput;
pub use profile::{ChangePasswordInput, UpdateProfileInput};
pub use register::RegisterInput;

#[derive(Clone)]
pub struct Command {
    state: mealmate_shared::State,
}

impl Deref for Command {
    type Target = mealmate_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: mealmate_shared::State) -> Self {
        Self { state }
    }

    pub async fn find(&self, find_type: FindType) -> mealmate_shared::Result<Option<UserRow>> {
        repository::find(&self.read_db, find_type).await
    }

    pub async fn find_by_email(
        &self,
        email: impl Into<String>,
    ) -> mealmate_shared::Result<Option<UserRow>> {
        repository::find(&self.read_db, FindType::Email(email.into())).await
    }

    pub async fn profile(&self, id: impl Into<String>) -> mealmate_shared::Result<UserRow> {
        let Some(user) = repository::find(&self.read_db, FindType::Id(id.into())).await? else {
            mealmate_shared::not_found!("user");
        };

        Ok(user)
    }

    /// Loads from the write pool so a read right after a write is consistent.
    pub async fn load(&self, id: impl Into<String>) -> mealmate_shared::Result<UserRow> {
        let Some(user) = repository::find(&self.write_db, FindType::Id(id.into())).await? else {
            mealmate_shared::not_found!("user");
        };

        Ok(user)
    }
}
