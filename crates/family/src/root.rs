use std::ops::Deref;

use mealmate_shared::now;
use ulid::Ulid;
use validator::Validate;

use crate::{MemberInput, MemberRow, repository};

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

    pub async fn list(&self, user_id: &str) -> mealmate_shared::Result<Vec<MemberRow>> {
        repository::list(&self.read_db, user_id, None).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> mealmate_shared::Result<MemberRow> {
        let Some(member) = repository::find(&self.read_db, user_id, id).await? else {
            mealmate_shared::not_found!("family member");
        };

        Ok(member)
    }

    pub async fn create(&self, user_id: &str, input: MemberInput) -> mealmate_shared::Result<MemberRow> {
        input.validate()?;
        let input = input.normalized();

        if repository::name_taken(&self.write_db, user_id, &input.name, None).await? {
            mealmate_shared::conflict!("A family member named '{}' already exists", input.name);
        }

        let id = Ulid::new().to_string();
        let name = input.name.to_owned();
        match repository::create(&self.write_db, &id, user_id, input, now()).await {
            Err(err) if err.is_unique_violation() => {
                mealmate_shared::conflict!("A family member named '{name}' already exists")
            }
            other => other?,
        }

        tracing::info!(user_id, member_id = %id, "family member created");

        self.load(user_id, &id).await
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: MemberInput,
    ) -> mealmate_shared::Result<MemberRow> {
        input.validate()?;
        let input = input.normalized();

        if repository::name_taken(&self.write_db, user_id, &input.name, Some(id)).await? {
            mealmate_shared::conflict!("A family member named '{}' already exists", input.name);
        }

        if !repository::update(&self.write_db, id, user_id, input, now()).await? {
            mealmate_shared::not_found!("family member");
        }

        self.load(user_id, id).await
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> mealmate_shared::Result<()> {
        if !repository::delete(&self.write_db, id, user_id).await? {
            mealmate_shared::not_found!("family member");
        }

        tracing::info!(user_id, member_id = id, "family member deleted");

        Ok(())
    }

    /// Members used to build an assistant prompt, all of them when `ids` is empty.
    pub async fn household_profile(
        &self,
        user_id: &str,
        ids: &[String],
    ) -> mealmate_shared::Result<Vec<MemberRow>> {
        if ids.is_empty() {
            return repository::list(&self.read_db, user_id, None).await;
        }

        let members = repository::list(&self.read_db, user_id, Some(ids)).await?;

        if let Some(missing) = ids.iter().find(|id| !members.iter().any(|m| &m.id == *id)) {
            mealmate_shared::not_found!("family member {missing}");
        }

        Ok(members)
    }

    async fn load(&self, user_id: &str, id: &str) -> mealmate_shared::Result<MemberRow> {
        let Some(member) = repository::find(&self.write_db, user_id, id).await? else {
            mealmate_shared::not_found!("family member");
        };

        Ok(member)
    }
}
