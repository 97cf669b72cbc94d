use mealmate_db::table::{MealPlanEntry, Recipe};
use mealmate_shared::recipe::MealType;
use sea_query::{Alias, Expr, ExprTrait, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, prelude::FromRow, types::Text};
use validator::Validate;

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct EntryInput {
    #[validate(custom(function = "mealmate_shared::validate_date"))]
    pub date: String,
    #[serde(default)]
    pub meal_type: MealType,
    #[validate(length(min = 1))]
    pub recipe_id: String,
    #[validate(range(min = 1, max = 50))]
    pub servings: Option<i64>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct EntryRow {
    pub id: String,
    pub meal_plan_id: String,
    pub recipe_id: String,
    pub recipe_name: String,
    pub date: String,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub meal_type: Text<MealType>,
    pub servings: i64,
    pub notes: Option<String>,
    pub created_at: i64,
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            (MealPlanEntry::Table, MealPlanEntry::Id),
            (MealPlanEntry::Table, MealPlanEntry::MealPlanId),
            (MealPlanEntry::Table, MealPlanEntry::RecipeId),
        ])
        .expr_as(
            Expr::col((Recipe::Table, Recipe::Name)),
            Alias::new("recipe_name"),
        )
        .columns([
            (MealPlanEntry::Table, MealPlanEntry::Date),
            (MealPlanEntry::Table, MealPlanEntry::MealType),
            (MealPlanEntry::Table, MealPlanEntry::Servings),
            (MealPlanEntry::Table, MealPlanEntry::Notes),
            (MealPlanEntry::Table, MealPlanEntry::CreatedAt),
        ])
        .from(MealPlanEntry::Table)
        .inner_join(
            Recipe::Table,
            Expr::col((Recipe::Table, Recipe::Id))
                .equals((MealPlanEntry::Table, MealPlanEntry::RecipeId)),
        )
        .to_owned()
}

/// Entries of a plan ordered by date, then meal of the day.
pub(crate) async fn list(pool: &SqlitePool, plan_id: &str) -> mealmate_shared::Result<Vec<EntryRow>> {
    let statement = select()
        .and_where(Expr::col((MealPlanEntry::Table, MealPlanEntry::MealPlanId)).eq(plan_id))
        .order_by((MealPlanEntry::Table, MealPlanEntry::Date), Order::Asc)
        .order_by((MealPlanEntry::Table, MealPlanEntry::CreatedAt), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let mut entries = sqlx::query_as_with::<_, EntryRow, _>(&sql, values)
        .fetch_all(pool)
        .await?;

    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.meal_type.0.cmp(&b.meal_type.0)));

    Ok(entries)
}

pub(crate) async fn find(
    pool: &SqlitePool,
    plan_id: &str,
    id: &str,
) -> mealmate_shared::Result<Option<EntryRow>> {
    let statement = select()
        .and_where(Expr::col((MealPlanEntry::Table, MealPlanEntry::Id)).eq(id))
        .and_where(Expr::col((MealPlanEntry::Table, MealPlanEntry::MealPlanId)).eq(plan_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, EntryRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct WriteInput {
    pub recipe_id: String,
    pub date: String,
    pub meal_type: MealType,
    pub servings: i64,
    pub notes: Option<String>,
}

pub(crate) async fn create(
    pool: &SqlitePool,
    id: &str,
    plan_id: &str,
    input: WriteInput,
    now: i64,
) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(MealPlanEntry::Table)
        .columns([
            MealPlanEntry::Id,
            MealPlanEntry::MealPlanId,
            MealPlanEntry::RecipeId,
            MealPlanEntry::Date,
            MealPlanEntry::MealType,
            MealPlanEntry::Servings,
            MealPlanEntry::Notes,
            MealPlanEntry::CreatedAt,
        ])
        .values_panic([
            id.into(),
            plan_id.into(),
            input.recipe_id.into(),
            input.date.into(),
            input.meal_type.to_string().into(),
            input.servings.into(),
            input.notes.into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub(crate) async fn update(
    pool: &SqlitePool,
    plan_id: &str,
    id: &str,
    input: WriteInput,
) -> mealmate_shared::Result<bool> {
    let statement = Query::update()
        .table(MealPlanEntry::Table)
        .values([
            (MealPlanEntry::RecipeId, input.recipe_id.into()),
            (MealPlanEntry::Date, input.date.into()),
            (MealPlanEntry::MealType, input.meal_type.to_string().into()),
            (MealPlanEntry::Servings, input.servings.into()),
            (MealPlanEntry::Notes, input.notes.into()),
        ])
        .and_where(Expr::col(MealPlanEntry::Id).eq(id))
        .and_where(Expr::col(MealPlanEntry::MealPlanId).eq(plan_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, plan_id: &str, id: &str) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(MealPlanEntry::Table)
        .and_where(Expr::col(MealPlanEntry::Id).eq(id))
        .and_where(Expr::col(MealPlanEntry::MealPlanId).eq(plan_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
