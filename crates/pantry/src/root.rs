use std::ops::Deref;

use mealmate_shared::{format_date, now, parse_date};
use time::{Date, Duration};
use ulid::Ulid;
use validator::Validate;

use crate::{
    AddItemInput, PantryFilter, PantryItemRow, UpdateItemInput, find_or_create_ingredient,
    item::{self, CreateInput, UpdateInput},
};

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

fn ensure_finite(quantity: Option<f64>) -> mealmate_shared::Result<()> {
    if quantity.is_some_and(|q| !q.is_finite()) {
        mealmate_shared::user!("Quantity must be a finite number");
    }

    Ok(())
}

fn normalize_date(value: Option<String>) -> mealmate_shared::Result<Option<String>> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .map(|v| parse_date(&v).map(format_date))
        .transpose()
}

impl Command {
    pub fn new(state: mealmate_shared::State) -> Self {
        Self { state }
    }

    pub async fn list(
        &self,
        user_id: &str,
        filter: PantryFilter,
    ) -> mealmate_shared::Result<Vec<PantryItemRow>> {
        item::list(&self.read_db, user_id, &filter).await
    }

    pub async fn get(&self, user_id: &str, id: &str) -> mealmate_shared::Result<PantryItemRow> {
        let Some(item) = item::find(&self.read_db, user_id, id).await? else {
            mealmate_shared::not_found!("pantry item");
        };

        Ok(item)
    }

    /// Adds stock, merging into an existing row for the same ingredient and unit.
    pub async fn add(&self, user_id: &str, input: AddItemInput) -> mealmate_shared::Result<PantryItemRow> {
        input.validate()?;
        ensure_finite(Some(input.quantity))?;

        let expires_on = normalize_date(input.expires_on)?;
        let notes = input.notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty());
        let ingredient = find_or_create_ingredient(&self.write_db, &input.name, input.category).await?;

        let id = Ulid::new().to_string();
        item::upsert(
            &self.write_db,
            CreateInput {
                id: id.to_owned(),
                user_id: user_id.to_owned(),
                ingredient_id: ingredient.id.to_owned(),
                quantity: input.quantity,
                unit: input.unit,
                expires_on,
                notes,
                now: now(),
            },
        )
        .await?;

        let Some(item) =
            item::find_by_ingredient(&self.write_db, user_id, &ingredient.id, input.unit).await?
        else {
            mealmate_shared::server!("pantry item for '{}' vanished after upsert", ingredient.name);
        };

        if item.id == id {
            tracing::info!(user_id, item_id = %id, ingredient = %ingredient.name, "pantry item added");
        } else {
            tracing::info!(user_id, item_id = %item.id, ingredient = %ingredient.name, "pantry item merged");
        }

        Ok(item)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: UpdateItemInput,
    ) -> mealmate_shared::Result<PantryItemRow> {
        input.validate()?;
        ensure_finite(input.quantity)?;

        let current = self.load(user_id, id).await?;

        if let Some(unit) = input.unit.filter(|u| *u != current.unit.0)
            && item::find_by_ingredient(&self.write_db, user_id, &current.ingredient_id, unit)
                .await?
                .is_some()
        {
            mealmate_shared::conflict!("'{}' is already stocked in {unit}", current.name);
        }

        let expires_on = match input.expires_on {
            Some(value) => Some(normalize_date(value)?),
            None => None,
        };

        item::update(
            &self.write_db,
            user_id,
            id,
            UpdateInput {
                quantity: input.quantity,
                unit: input.unit,
                expires_on,
                notes: input
                    .notes
                    .map(|n| Some(n.trim().to_owned()).filter(|n| !n.is_empty())),
            },
        )
        .await?;

        self.load(user_id, id).await
    }

    pub async fn remove(&self, user_id: &str, id: &str) -> mealmate_shared::Result<()> {
        if !item::delete(&self.write_db, user_id, id).await? {
            mealmate_shared::not_found!("pantry item");
        }

        tracing::info!(user_id, item_id = id, "pantry item removed");

        Ok(())
    }

    /// Items expiring on or before `today + within_days`, soonest first.
    pub async fn expiring(
        &self,
        user_id: &str,
        within_days: i64,
        today: Date,
    ) -> mealmate_shared::Result<Vec<PantryItemRow>> {
        if !(0..=365).contains(&within_days) {
            mealmate_shared::user!("days must be between 0 and 365");
        }

        let until = today
            .checked_add(Duration::days(within_days))
            .unwrap_or(Date::MAX);

        item::expiring(&self.read_db, user_id, &format_date(until)).await
    }

    async fn load(&self, user_id: &str, id: &str) -> mealmate_shared::Result<PantryItemRow> {
        let Some(item) = item::find(&self.write_db, user_id, id).await? else {
            mealmate_shared::not_found!("pantry item");
        };

        Ok(item)
    }
}
