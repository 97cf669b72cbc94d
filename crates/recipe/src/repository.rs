use std::collections::HashMap;

use mealmate_db::table::{Recipe, RecipeRating};
use mealmate_shared::recipe::{MealType, RecipeIngredient, RecipeSource};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{
    SqlitePool,
    prelude::FromRow,
    types::{Json, Text},
};

use crate::{RecipeFilter, RecipeInput};

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct RecipeRow {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub meal_type: Text<MealType>,
    pub prep_time_minutes: i64,
    pub cook_time_minutes: i64,
    pub servings: i64,
    pub ingredients: Json<Vec<RecipeIngredient>>,
    pub instructions: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub source: Text<RecipeSource>,
    pub source_url: Option<String>,
    pub is_favorite: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl RecipeRow {
    pub fn total_time_minutes(&self) -> i64 {
        self.prep_time_minutes + self.cook_time_minutes
    }

    pub fn to_input(&self) -> RecipeInput {
        RecipeInput {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            cuisine: self.cuisine.to_owned(),
            meal_type: self.meal_type.0,
            prep_time_minutes: self.prep_time_minutes,
            cook_time_minutes: self.cook_time_minutes,
            servings: self.servings,
            ingredients: self.ingredients.0.to_owned(),
            instructions: self.instructions.0.to_owned(),
            tags: self.tags.0.to_owned(),
            source: self.source.0,
            source_url: self.source_url.to_owned(),
            is_favorite: self.is_favorite,
        }
    }
}

/// A recipe with its rating aggregate.
#[derive(Serialize, Clone, Debug)]
pub struct RecipeView {
    #[serde(flatten)]
    pub recipe: RecipeRow,
    pub average_rating: Option<f64>,
    pub rating_count: i64,
}

const COLUMNS: [Recipe; 17] = [
    Recipe::Id,
    Recipe::UserId,
    Recipe::Name,
    Recipe::Description,
    Recipe::Cuisine,
    Recipe::MealType,
    Recipe::PrepTimeMinutes,
    Recipe::CookTimeMinutes,
    Recipe::Servings,
    Recipe::Ingredients,
    Recipe::Instructions,
    Recipe::Tags,
    Recipe::Source,
    Recipe::SourceUrl,
    Recipe::IsFavorite,
    Recipe::CreatedAt,
    Recipe::UpdatedAt,
];

fn apply_filter(statement: &mut SelectStatement, user_id: &str, filter: &RecipeFilter) {
    statement.and_where(Expr::col(Recipe::UserId).eq(user_id));

    if let Some(search) = filter
        .search
        .as_ref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{search}%");
        statement.and_where(
            Expr::col(Recipe::Name)
                .like(pattern.to_owned())
                .or(Expr::col(Recipe::Description).like(pattern.to_owned()))
                .or(Expr::col(Recipe::Cuisine).like(pattern)),
        );
    }

    if let Some(meal_type) = filter.meal_type {
        statement.and_where(Expr::col(Recipe::MealType).eq(meal_type.to_string()));
    }

    if let Some(favorite) = filter.favorite {
        statement.and_where(Expr::col(Recipe::IsFavorite).eq(favorite));
    }

    if let Some(source) = filter.source {
        statement.and_where(Expr::col(Recipe::Source).eq(source.to_string()));
    }

    if let Some(tag) = filter
        .tag
        .as_ref()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
    {
        statement.and_where(Expr::cust_with_values(
            "EXISTS (SELECT 1 FROM json_each(\"tags\") WHERE json_each.value = ?)",
            [tag],
        ));
    }
}

pub(crate) async fn count(
    pool: &SqlitePool,
    user_id: &str,
    filter: &RecipeFilter,
) -> mealmate_shared::Result<i64> {
    let mut statement = Query::select()
        .expr(Func::count(Expr::col(Recipe::Id)))
        .from(Recipe::Table)
        .to_owned();
    apply_filter(&mut statement, user_id, filter);

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub(crate) async fn list(
    pool: &SqlitePool,
    user_id: &str,
    filter: &RecipeFilter,
) -> mealmate_shared::Result<Vec<RecipeRow>> {
    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(Recipe::Table)
        .order_by(Recipe::CreatedAt, Order::Desc)
        .order_by(Recipe::Id, Order::Desc)
        .limit(filter.pagination.limit())
        .offset(filter.pagination.offset())
        .to_owned();
    apply_filter(&mut statement, user_id, filter);

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

/// Every recipe of the user, oldest first, for exports.
pub(crate) async fn all(pool: &SqlitePool, user_id: &str) -> mealmate_shared::Result<Vec<RecipeRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(Recipe::Table)
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .order_by(Recipe::CreatedAt, Order::Asc)
        .order_by(Recipe::Id, Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> mealmate_shared::Result<Option<RecipeRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(Recipe::Table)
        .and_where(Expr::col(Recipe::Id).eq(id))
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

/// Average score and rating count keyed by recipe id.
pub(crate) async fn rating_aggregates(
    pool: &SqlitePool,
    ids: Vec<String>,
) -> mealmate_shared::Result<HashMap<String, (f64, i64)>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let statement = Query::select()
        .column(RecipeRating::RecipeId)
        .expr(Func::avg(Expr::col(RecipeRating::Score)))
        .expr(Func::count(Expr::col(RecipeRating::UserId)))
        .from(RecipeRating::Table)
        .and_where(Expr::col(RecipeRating::RecipeId).is_in(ids))
        .group_by_col(RecipeRating::RecipeId)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let rows = sqlx::query_as_with::<_, (String, f64, i64), _>(&sql, values)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(id, average, count)| (id, (average, count)))
        .collect())
}

pub(crate) async fn with_ratings(
    pool: &SqlitePool,
    recipes: Vec<RecipeRow>,
) -> mealmate_shared::Result<Vec<RecipeView>> {
    let aggregates =
        rating_aggregates(pool, recipes.iter().map(|r| r.id.to_owned()).collect()).await?;

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let (average_rating, rating_count) = match aggregates.get(&recipe.id) {
                Some((average, count)) => (Some((average * 10.0).round() / 10.0), *count),
                None => (None, 0),
            };

            RecipeView {
                recipe,
                average_rating,
                rating_count,
            }
        })
        .collect())
}

pub(crate) async fn create(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: RecipeInput,
    now: i64,
) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(Recipe::Table)
        .columns(COLUMNS)
        .values_panic([
            id.into(),
            user_id.into(),
            input.name.into(),
            input.description.into(),
            input.cuisine.into(),
            input.meal_type.to_string().into(),
            input.prep_time_minutes.into(),
            input.cook_time_minutes.into(),
            input.servings.into(),
            serde_json::to_string(&input.ingredients)?.into(),
            serde_json::to_string(&input.instructions)?.into(),
            serde_json::to_string(&input.tags)?.into(),
            input.source.to_string().into(),
            input.source_url.into(),
            input.is_favorite.into(),
            now.into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub(crate) async fn update(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: RecipeInput,
    now: i64,
) -> mealmate_shared::Result<bool> {
    let statement = Query::update()
        .table(Recipe::Table)
        .values([
            (Recipe::Name, input.name.into()),
            (Recipe::Description, input.description.into()),
            (Recipe::Cuisine, input.cuisine.into()),
            (Recipe::MealType, input.meal_type.to_string().into()),
            (Recipe::PrepTimeMinutes, input.prep_time_minutes.into()),
            (Recipe::CookTimeMinutes, input.cook_time_minutes.into()),
            (Recipe::Servings, input.servings.into()),
            (
                Recipe::Ingredients,
                serde_json::to_string(&input.ingredients)?.into(),
            ),
            (
                Recipe::Instructions,
                serde_json::to_string(&input.instructions)?.into(),
            ),
            (Recipe::Tags, serde_json::to_string(&input.tags)?.into()),
            (Recipe::Source, input.source.to_string().into()),
            (Recipe::SourceUrl, input.source_url.into()),
            (Recipe::IsFavorite, input.is_favorite.into()),
            (Recipe::UpdatedAt, now.into()),
        ])
        .and_where(Expr::col(Recipe::Id).eq(id))
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn set_favorite(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    favorite: bool,
) -> mealmate_shared::Result<bool> {
    let statement = Query::update()
        .table(Recipe::Table)
        .value(Recipe::IsFavorite, favorite)
        .value(Recipe::UpdatedAt, mealmate_shared::now())
        .and_where(Expr::col(Recipe::Id).eq(id))
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, id: &str, user_id: &str) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(Recipe::Table)
        .and_where(Expr::col(Recipe::Id).eq(id))
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
