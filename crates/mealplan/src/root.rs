use std::{collections::HashMap, ops::Deref};

use mealmate_pantry::PantryFilter;
use mealmate_shared::{Page, Pagination, format_date, now, parse_date};
use ulid::Ulid;
use validator::Validate;

use crate::{
    EntryInput, EntryRow, PlanDetail, PlanInput, PlanRow, PlannedRecipe, ShoppingList, aggregate,
    entry, plan,
};

#[derive(Clone)]
pub struct Command {
    state: mealmate_shared::State,
    recipes: mealmate_recipe::Command,
    pantry: mealmate_pantry::Command,
}

impl Deref for Command {
    type Target = mealmate_shared::State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

fn clean_notes(notes: Option<String>) -> Option<String> {
    notes.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty())
}

impl Command {
    pub fn new(state: mealmate_shared::State) -> Self {
        Self {
            recipes: mealmate_recipe::Command::new(state.clone()),
            pantry: mealmate_pantry::Command::new(state.clone()),
            state,
        }
    }

    pub async fn list(
        &self,
        user_id: &str,
        pagination: Pagination,
    ) -> mealmate_shared::Result<Page<PlanRow>> {
        let total = plan::count(&self.read_db, user_id).await?;
        let plans = plan::list(&self.read_db, user_id, pagination).await?;

        Ok(Page::new(plans, total, pagination))
    }

    pub async fn get(&self, user_id: &str, id: &str) -> mealmate_shared::Result<PlanDetail> {
        let plan = self.find(&self.read_db, user_id, id).await?;
        let entries = entry::list(&self.read_db, id).await?;

        Ok(PlanDetail { plan, entries })
    }

    pub async fn create(&self, user_id: &str, input: PlanInput) -> mealmate_shared::Result<PlanDetail> {
        input.validate()?;
        let (start, end) = input.range()?;

        let id = Ulid::new().to_string();
        plan::create(
            &self.write_db,
            &id,
            user_id,
            plan::WriteInput {
                name: input.name.trim().to_owned(),
                start_date: format_date(start),
                end_date: format_date(end),
                notes: clean_notes(input.notes),
            },
            now(),
        )
        .await?;

        tracing::info!(user_id, plan_id = %id, "meal plan created");

        let plan = self.find(&self.write_db, user_id, &id).await?;

        Ok(PlanDetail {
            plan,
            entries: vec![],
        })
    }

    /// Renames or moves a plan. Existing entries must fit the new range.
    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: PlanInput,
    ) -> mealmate_shared::Result<PlanDetail> {
        input.validate()?;
        let (start, end) = input.range()?;

        self.find(&self.write_db, user_id, id).await?;

        let (start_date, end_date) = (format_date(start), format_date(end));
        let entries = entry::list(&self.write_db, id).await?;
        let outside = entries
            .iter()
            .filter(|e| e.date < start_date || e.date > end_date)
            .count();

        if outside > 0 {
            mealmate_shared::user!("{outside} entries fall outside the new date range");
        }

        plan::update(
            &self.write_db,
            id,
            user_id,
            plan::WriteInput {
                name: input.name.trim().to_owned(),
                start_date,
                end_date,
                notes: clean_notes(input.notes),
            },
            now(),
        )
        .await?;

        let plan = self.find(&self.write_db, user_id, id).await?;

        Ok(PlanDetail { plan, entries })
    }

    pub async fn delete(&self, user_id: &str, id: &str) -> mealmate_shared::Result<()> {
        if !plan::delete(&self.write_db, id, user_id).await? {
            mealmate_shared::not_found!("meal plan");
        }

        tracing::info!(user_id, plan_id = id, "meal plan deleted");

        Ok(())
    }

    async fn entry_input(
        &self,
        user_id: &str,
        plan: &PlanRow,
        input: EntryInput,
    ) -> mealmate_shared::Result<entry::WriteInput> {
        input.validate()?;

        let date = format_date(parse_date(&input.date)?);
        if !plan.contains(&date) {
            mealmate_shared::user!(
                "{date} is outside the plan range {} to {}",
                plan.start_date,
                plan.end_date
            );
        }

        let recipe = self.recipes.find(user_id, &input.recipe_id).await?;

        Ok(entry::WriteInput {
            recipe_id: recipe.id,
            date,
            meal_type: input.meal_type,
            servings: input.servings.unwrap_or(recipe.servings),
            notes: clean_notes(input.notes),
        })
    }

    pub async fn add_entry(
        &self,
        user_id: &str,
        plan_id: &str,
        input: EntryInput,
    ) -> mealmate_shared::Result<EntryRow> {
        let plan = self.find(&self.write_db, user_id, plan_id).await?;
        let input = self.entry_input(user_id, &plan, input).await?;

        let id = Ulid::new().to_string();
        entry::create(&self.write_db, &id, plan_id, input, now()).await?;

        self.load_entry(plan_id, &id).await
    }

    pub async fn update_entry(
        &self,
        user_id: &str,
        plan_id: &str,
        id: &str,
        input: EntryInput,
    ) -> mealmate_shared::Result<EntryRow> {
        let plan = self.find(&self.write_db, user_id, plan_id).await?;
        let input = self.entry_input(user_id, &plan, input).await?;

        if !entry::update(&self.write_db, plan_id, id, input).await? {
            mealmate_shared::not_found!("meal plan entry");
        }

        self.load_entry(plan_id, id).await
    }

    pub async fn remove_entry(
        &self,
        user_id: &str,
        plan_id: &str,
        id: &str,
    ) -> mealmate_shared::Result<()> {
        self.find(&self.write_db, user_id, plan_id).await?;

        if !entry::delete(&self.write_db, plan_id, id).await? {
            mealmate_shared::not_found!("meal plan entry");
        }

        Ok(())
    }

    /// Ingredients needed for every planned meal, minus what the pantry holds.
    pub async fn shopping_list(
        &self,
        user_id: &str,
        plan_id: &str,
    ) -> mealmate_shared::Result<ShoppingList> {
        let detail = self.get(user_id, plan_id).await?;

        let mut recipes = HashMap::new();
        for entry in detail.entries.iter() {
            if !recipes.contains_key(&entry.recipe_id) {
                let recipe = self.recipes.find(user_id, &entry.recipe_id).await?;
                recipes.insert(entry.recipe_id.to_owned(), recipe);
            }
        }

        let pantry = self.pantry.list(user_id, PantryFilter::default()).await?;

        let planned = detail.entries.iter().filter_map(|entry| {
            let recipe = recipes.get(&entry.recipe_id)?;

            Some(PlannedRecipe {
                name: &recipe.name,
                ingredients: &recipe.ingredients.0,
                factor: entry.servings as f64 / recipe.servings.max(1) as f64,
            })
        });

        let items = aggregate(
            planned,
            pantry.iter().map(|i| (i.name.as_str(), i.unit.0, i.quantity)),
        );

        Ok(ShoppingList {
            meal_plan_id: detail.plan.id,
            items,
        })
    }

    async fn find(
        &self,
        pool: &sqlx::SqlitePool,
        user_id: &str,
        id: &str,
    ) -> mealmate_shared::Result<PlanRow> {
        let Some(plan) = plan::find(pool, user_id, id).await? else {
            mealmate_shared::not_found!("meal plan");
        };

        Ok(plan)
    }

    async fn load_entry(&self, plan_id: &str, id: &str) -> mealmate_shared::Result<EntryRow> {
        let Some(entry) = entry::find(&self.write_db, plan_id, id).await? else {
            mealmate_shared::not_found!("meal plan entry");
        };

        Ok(entry)
    }
}
