use mealmate_db::table::{FamilyMember, MealPlan, PantryItem, Recipe, User};
use mealmate_shared::user::{Role, State};
use sea_query::{Expr, ExprTrait, Func, IntoTableRef, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::SqlitePool;

const THIRTY_DAYS: i64 = 30 * 24 * 60 * 60;

#[derive(Serialize, Debug, Default, Clone, PartialEq)]
pub struct GlobalStat {
    pub total_users: i64,
    pub active_users: i64,
    pub suspended_users: i64,
    pub admin_users: i64,
    pub new_users_last_30_days: i64,
    pub total_recipes: i64,
    pub total_meal_plans: i64,
    pub total_pantry_items: i64,
    pub total_family_members: i64,
}

async fn count_rows(
    pool: &SqlitePool,
    table: impl IntoTableRef,
    condition: Option<Expr>,
) -> mealmate_shared::Result<i64> {
    let mut statement = Query::select()
        .expr(Func::count(Expr::cust("*")))
        .from(table)
        .to_owned();

    if let Some(condition) = condition {
        statement.and_where(condition);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let (count,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

pub async fn global_stats(pool: &SqlitePool, now: i64) -> mealmate_shared::Result<GlobalStat> {
    Ok(GlobalStat {
        total_users: count_rows(pool, User::Table, None).await?,
        active_users: count_rows(
            pool,
            User::Table,
            Some(Expr::col(User::State).eq(State::Active.to_string())),
        )
        .await?,
        suspended_users: count_rows(
            pool,
            User::Table,
            Some(Expr::col(User::State).eq(State::Suspended.to_string())),
        )
        .await?,
        admin_users: count_rows(
            pool,
            User::Table,
            Some(Expr::col(User::Role).eq(Role::Admin.to_string())),
        )
        .await?,
        new_users_last_30_days: count_rows(
            pool,
            User::Table,
            Some(Expr::col(User::CreatedAt).gte(now - THIRTY_DAYS)),
        )
        .await?,
        total_recipes: count_rows(pool, Recipe::Table, None).await?,
        total_meal_plans: count_rows(pool, MealPlan::Table, None).await?,
        total_pantry_items: count_rows(pool, PantryItem::Table, None).await?,
        total_family_members: count_rows(pool, FamilyMember::Table, None).await?,
    })
}
