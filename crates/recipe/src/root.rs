use std::ops::Deref;

use mealmate_shared::{Page, now, recipe::RecipeSource};
use ulid::Ulid;
use validator::Validate;

use crate::{
    ImportReport, RateInput, RatingSummary, RecipeFilter, RecipeInput, RecipeRow, RecipeView,
    UrlImporter,
    import::{read_csv, write_csv},
    rating, repository,
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

impl Command {
    pub fn new(state: mealmate_shared::State) -> Self {
        Self { state }
    }

    pub async fn list(
        &self,
        user_id: &str,
        filter: RecipeFilter,
    ) -> mealmate_shared::Result<Page<RecipeView>> {
        let total = repository::count(&self.read_db, user_id, &filter).await?;
        let recipes = repository::list(&self.read_db, user_id, &filter).await?;
        let items = repository::with_ratings(&self.read_db, recipes).await?;

        Ok(Page::new(items, total, filter.pagination))
    }

    pub async fn get(&self, user_id: &str, id: &str) -> mealmate_shared::Result<RecipeView> {
        let recipe = self.find(user_id, id).await?;
        let mut views = repository::with_ratings(&self.read_db, vec![recipe]).await?;

        match views.pop() {
            Some(view) => Ok(view),
            None => mealmate_shared::not_found!("recipe"),
        }
    }

    /// Loads a recipe row, reporting recipes of other users as missing.
    pub async fn find(&self, user_id: &str, id: &str) -> mealmate_shared::Result<RecipeRow> {
        let Some(recipe) = repository::find(&self.read_db, user_id, id).await? else {
            mealmate_shared::not_found!("recipe");
        };

        Ok(recipe)
    }

    pub async fn create(&self, user_id: &str, input: RecipeInput) -> mealmate_shared::Result<String> {
        input.validate()?;

        let id = Ulid::new().to_string();
        repository::create(&self.write_db, &id, user_id, input.normalized(), now()).await?;

        tracing::info!(user_id, recipe_id = %id, "recipe created");

        Ok(id)
    }

    pub async fn update(
        &self,
        user_id: &str,
        id: &str,
        input: RecipeInput,
    ) -> mealmate_shared::Result<()> {
        input.validate()?;

        if !repository::update(&self.write_db, id, user_id, input.normalized(), now()).await? {
            mealmate_shared::not_found!("recipe");
        }

        Ok(())
    }

    /// Deletes the recipe along with its ratings and meal plan entries.
    pub async fn delete(&self, user_id: &str, id: &str) -> mealmate_shared::Result<()> {
        if !repository::delete(&self.write_db, id, user_id).await? {
            mealmate_shared::not_found!("recipe");
        }

        tracing::info!(user_id, recipe_id = id, "recipe deleted");

        Ok(())
    }

    pub async fn set_favorite(
        &self,
        user_id: &str,
        id: &str,
        favorite: bool,
    ) -> mealmate_shared::Result<()> {
        if !repository::set_favorite(&self.write_db, id, user_id, favorite).await? {
            mealmate_shared::not_found!("recipe");
        }

        Ok(())
    }

    pub async fn rate(
        &self,
        user_id: &str,
        id: &str,
        input: RateInput,
    ) -> mealmate_shared::Result<RatingSummary> {
        input.validate()?;

        if repository::find(&self.write_db, user_id, id).await?.is_none() {
            mealmate_shared::not_found!("recipe");
        }

        rating::upsert(&self.write_db, id, user_id, input, now()).await?;

        self.summary(&self.write_db, user_id, id).await
    }

    pub async fn unrate(&self, user_id: &str, id: &str) -> mealmate_shared::Result<()> {
        if repository::find(&self.write_db, user_id, id).await?.is_none() {
            mealmate_shared::not_found!("recipe");
        }

        if !rating::delete(&self.write_db, id, user_id).await? {
            mealmate_shared::not_found!("rating");
        }

        Ok(())
    }

    pub async fn ratings(&self, user_id: &str, id: &str) -> mealmate_shared::Result<RatingSummary> {
        self.find(user_id, id).await?;

        self.summary(&self.read_db, user_id, id).await
    }

    async fn summary(
        &self,
        pool: &sqlx::SqlitePool,
        user_id: &str,
        id: &str,
    ) -> mealmate_shared::Result<RatingSummary> {
        let aggregates = repository::rating_aggregates(pool, vec![id.to_owned()]).await?;
        let (average, count) = match aggregates.get(id) {
            Some((average, count)) => (Some((average * 10.0).round() / 10.0), *count),
            None => (None, 0),
        };

        Ok(RatingSummary {
            average,
            count,
            mine: rating::find(pool, id, user_id).await?,
        })
    }

    pub async fn export_json(&self, user_id: &str) -> mealmate_shared::Result<Vec<RecipeInput>> {
        let recipes = repository::all(&self.read_db, user_id).await?;

        Ok(recipes.iter().map(RecipeRow::to_input).collect())
    }

    pub async fn export_csv(&self, user_id: &str) -> mealmate_shared::Result<String> {
        let recipes = self.export_json(user_id).await?;

        write_csv(&recipes)
    }

    /// Imports every valid recipe, reporting invalid ones by 1-based position.
    /// Imports each array element on its own, malformed elements are reported
    /// by position.
    pub async fn import_json(
        &self,
        user_id: &str,
        recipes: Vec<serde_json::Value>,
    ) -> mealmate_shared::Result<ImportReport> {
        let rows = recipes
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                let recipe = serde_json::from_value::<RecipeInput>(value).map_err(|e| e.to_string());
                (index + 1, recipe)
            })
            .collect();

        self.import_rows(user_id, rows).await
    }

    pub async fn import_csv(&self, user_id: &str, text: &str) -> mealmate_shared::Result<ImportReport> {
        if text.trim().is_empty() {
            mealmate_shared::user!("CSV body is empty");
        }

        self.import_rows(user_id, read_csv(text)).await
    }

    async fn import_rows(
        &self,
        user_id: &str,
        rows: Vec<(usize, Result<RecipeInput, String>)>,
    ) -> mealmate_shared::Result<ImportReport> {
        let mut report = ImportReport::default();

        for (row, recipe) in rows {
            let mut recipe = match recipe {
                Ok(recipe) => recipe,
                Err(message) => {
                    report.fail(row, message);
                    continue;
                }
            };

            if recipe.source == RecipeSource::Manual {
                recipe.source = RecipeSource::Imported;
            }

            match self.create(user_id, recipe).await {
                Ok(id) => report.imported.push(id),
                Err(mealmate_shared::Error::Validate(errors)) => report.fail(row, errors.to_string()),
                Err(err) => return Err(err),
            }
        }

        tracing::info!(
            user_id,
            imported = report.imported.len(),
            failed = report.errors.len(),
            "recipes imported"
        );

        Ok(report)
    }

    /// Saves the schema.org recipe found at `url`.
    pub async fn import_url(
        &self,
        user_id: &str,
        importer: &UrlImporter,
        url: &str,
    ) -> mealmate_shared::Result<String> {
        let recipe = importer.fetch(url).await?;

        self.create(user_id, recipe).await
    }
}
