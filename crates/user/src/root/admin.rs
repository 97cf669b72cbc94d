use mealmate_shared::{
    now,
    user::{Role, State},
};
use ulid::Ulid;

use crate::repository::{self, FindType};

impl super::Command {
    pub async fn suspend(&self, id: impl Into<String>) -> mealmate_shared::Result<()> {
        self.set_state(id.into(), State::Suspended).await
    }

    pub async fn activate(&self, id: impl Into<String>) -> mealmate_shared::Result<()> {
        self.set_state(id.into(), State::Active).await
    }

    async fn set_state(&self, id: String, state: State) -> mealmate_shared::Result<()> {
        let user = self.load(&id).await?;

        if user.state.0 == state {
            return Ok(());
        }

        repository::update(
            &self.write_db,
            repository::UpdateInput {
                id,
                state: Some(state),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, %state, "user state changed");

        Ok(())
    }

    pub async fn set_role(&self, id: impl Into<String>, role: Role) -> mealmate_shared::Result<()> {
        let user = self.load(id).await?;

        if user.role.0 == role {
            return Ok(());
        }

        repository::update(
            &self.write_db,
            repository::UpdateInput {
                id: user.id.to_owned(),
                role: Some(role),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = %user.id, %role, "user role changed");

        Ok(())
    }

    /// Creates the configured root account, or promotes and reactivates it.
    pub async fn ensure_root(
        &self,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> mealmate_shared::Result<String> {
        let email = email.into();

        if let Some(user) = repository::find(&self.write_db, FindType::Email(email.to_owned())).await? {
            repository::update(
                &self.write_db,
                repository::UpdateInput {
                    id: user.id.to_owned(),
                    role: Some(Role::Admin),
                    state: Some(State::Active),
                    ..Default::default()
                },
            )
            .await?;

            return Ok(user.id);
        }

        let password = password.into();
        if password.len() < 8 {
            mealmate_shared::user!("Root password must be at least 8 characters");
        }

        let id = Ulid::new().to_string();
        repository::create(
            &self.write_db,
            repository::CreateInput {
                id: id.to_owned(),
                email,
                password: crate::hash_password(&password)?,
                full_name: None,
                role: Role::Admin,
                now: now(),
            },
        )
        .await?;

        tracing::info!(user_id = %id, "root user created");

        Ok(id)
    }
}
