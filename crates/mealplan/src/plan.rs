use mealmate_db::table::MealPlan;
use mealmate_shared::{Pagination, days_between, parse_date};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, prelude::FromRow};
use time::Date;
use validator::Validate;

use crate::EntryRow;

pub const MAX_PLAN_DAYS: i64 = 31;

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct PlanInput {
    #[validate(length(min = 1, max = 80), custom(function = "mealmate_shared::validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "mealmate_shared::validate_date"))]
    pub start_date: String,
    #[validate(custom(function = "mealmate_shared::validate_date"))]
    pub end_date: String,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

impl PlanInput {
    /// Parsed `(start, end)` once the range rules hold.
    pub(crate) fn range(&self) -> mealmate_shared::Result<(Date, Date)> {
        let start = parse_date(&self.start_date)?;
        let end = parse_date(&self.end_date)?;

        if end < start {
            mealmate_shared::user!("end_date must not be before start_date");
        }

        if days_between(start, end) + 1 > MAX_PLAN_DAYS {
            mealmate_shared::user!("A meal plan can span at most {MAX_PLAN_DAYS} days");
        }

        Ok((start, end))
    }
}

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct PlanRow {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PlanRow {
    pub fn contains(&self, date: &str) -> bool {
        self.start_date.as_str() <= date && date <= self.end_date.as_str()
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: PlanRow,
    pub entries: Vec<EntryRow>,
}

const COLUMNS: [MealPlan; 8] = [
    MealPlan::Id,
    MealPlan::UserId,
    MealPlan::Name,
    MealPlan::StartDate,
    MealPlan::EndDate,
    MealPlan::Notes,
    MealPlan::CreatedAt,
    MealPlan::UpdatedAt,
];

pub(crate) async fn count(pool: &SqlitePool, user_id: &str) -> mealmate_shared::Result<i64> {
    let statement = Query::select()
        .expr(Func::count(Expr::col(MealPlan::Id)))
        .from(MealPlan::Table)
        .and_where(Expr::col(MealPlan::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    Ok(total)
}

pub(crate) async fn list(
    pool: &SqlitePool,
    user_id: &str,
    pagination: Pagination,
) -> mealmate_shared::Result<Vec<PlanRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(MealPlan::Table)
        .and_where(Expr::col(MealPlan::UserId).eq(user_id))
        .order_by(MealPlan::StartDate, Order::Desc)
        .order_by(MealPlan::CreatedAt, Order::Desc)
        .limit(pagination.limit())
        .offset(pagination.offset())
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PlanRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> mealmate_shared::Result<Option<PlanRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(MealPlan::Table)
        .and_where(Expr::col(MealPlan::Id).eq(id))
        .and_where(Expr::col(MealPlan::UserId).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PlanRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct WriteInput {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub notes: Option<String>,
}

pub(crate) async fn create(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: WriteInput,
    now: i64,
) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(MealPlan::Table)
        .columns(COLUMNS)
        .values_panic([
            id.into(),
            user_id.into(),
            input.name.into(),
            input.start_date.into(),
            input.end_date.into(),
            input.notes.into(),
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
    input: WriteInput,
    now: i64,
) -> mealmate_shared::Result<bool> {
    let statement = Query::update()
        .table(MealPlan::Table)
        .values([
            (MealPlan::Name, input.name.into()),
            (MealPlan::StartDate, input.start_date.into()),
            (MealPlan::EndDate, input.end_date.into()),
            (MealPlan::Notes, input.notes.into()),
            (MealPlan::UpdatedAt, now.into()),
        ])
        .and_where(Expr::col(MealPlan::Id).eq(id))
        .and_where(Expr::col(MealPlan::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, id: &str, user_id: &str) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(MealPlan::Table)
        .and_where(Expr::col(MealPlan::Id).eq(id))
        .and_where(Expr::col(MealPlan::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(start: &str, end: &str) -> PlanInput {
        PlanInput {
            name: "Week".to_owned(),
            start_date: start.to_owned(),
            end_date: end.to_owned(),
            notes: None,
        }
    }

    #[test]
    fn range_rules() {
        assert!(plan("2026-01-05", "2026-01-11").range().is_ok());
        assert!(plan("2026-01-05", "2026-01-05").range().is_ok());
        assert!(plan("2026-01-01", "2026-01-31").range().is_ok());
        assert!(plan("2026-01-01", "2026-02-01").range().is_err());
        assert!(plan("2026-01-05", "2026-01-04").range().is_err());
    }
}
