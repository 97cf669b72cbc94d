use mealmate_db::table::RecipeRating;
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, prelude::FromRow};
use validator::Validate;

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct RateInput {
    #[validate(range(min = 1, max = 5))]
    pub score: i64,
    #[validate(length(max = 500))]
    pub comment: Option<String>,
}

#[derive(FromRow, Serialize, Clone, Debug, PartialEq)]
pub struct RatingRow {
    pub recipe_id: String,
    pub score: i64,
    pub comment: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct RatingSummary {
    pub average: Option<f64>,
    pub count: i64,
    pub mine: Option<RatingRow>,
}

pub(crate) async fn upsert(
    pool: &SqlitePool,
    recipe_id: &str,
    user_id: &str,
    input: RateInput,
    now: i64,
) -> mealmate_shared::Result<()> {
    let comment = input
        .comment
        .map(|c| c.trim().to_owned())
        .filter(|c| !c.is_empty());

    let statement = Query::insert()
        .into_table(RecipeRating::Table)
        .columns([
            RecipeRating::RecipeId,
            RecipeRating::UserId,
            RecipeRating::Score,
            RecipeRating::Comment,
            RecipeRating::CreatedAt,
            RecipeRating::UpdatedAt,
        ])
        .values_panic([
            recipe_id.into(),
            user_id.into(),
            input.score.into(),
            comment.into(),
            now.into(),
            now.into(),
        ])
        .on_conflict(
            OnConflict::columns([RecipeRating::RecipeId, RecipeRating::UserId])
                .update_columns([
                    RecipeRating::Score,
                    RecipeRating::Comment,
                    RecipeRating::UpdatedAt,
                ])
                .to_owned(),
        )
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub(crate) async fn find(
    pool: &SqlitePool,
    recipe_id: &str,
    user_id: &str,
) -> mealmate_shared::Result<Option<RatingRow>> {
    let statement = Query::select()
        .columns([
            RecipeRating::RecipeId,
            RecipeRating::Score,
            RecipeRating::Comment,
            RecipeRating::CreatedAt,
            RecipeRating::UpdatedAt,
        ])
        .from(RecipeRating::Table)
        .and_where(Expr::col(RecipeRating::RecipeId).eq(recipe_id))
        .and_where(Expr::col(RecipeRating::UserId).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RatingRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn delete(
    pool: &SqlitePool,
    recipe_id: &str,
    user_id: &str,
) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(RecipeRating::Table)
        .and_where(Expr::col(RecipeRating::RecipeId).eq(recipe_id))
        .and_where(Expr::col(RecipeRating::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
