use mealmate_db::table::FamilyMember;
use mealmate_shared::family::DietaryPreference;
use sea_query::{Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow, types::Json};

use crate::MemberInput;

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct MemberRow {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub name: String,
    pub age: Option<i64>,
    pub dietary_preferences: Json<Vec<DietaryPreference>>,
    pub allergies: Json<Vec<String>>,
    pub dislikes: Json<Vec<String>>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

const COLUMNS: [FamilyMember; 10] = [
    FamilyMember::Id,
    FamilyMember::UserId,
    FamilyMember::Name,
    FamilyMember::Age,
    FamilyMember::DietaryPreferences,
    FamilyMember::Allergies,
    FamilyMember::Dislikes,
    FamilyMember::Notes,
    FamilyMember::CreatedAt,
    FamilyMember::UpdatedAt,
];

pub(crate) async fn list(
    pool: &SqlitePool,
    user_id: &str,
    ids: Option<&[String]>,
) -> mealmate_shared::Result<Vec<MemberRow>> {
    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(FamilyMember::Table)
        .and_where(Expr::col(FamilyMember::UserId).eq(user_id))
        .order_by(FamilyMember::Name, Order::Asc)
        .to_owned();

    if let Some(ids) = ids {
        statement.and_where(Expr::col(FamilyMember::Id).is_in(ids.to_vec()));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, MemberRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> mealmate_shared::Result<Option<MemberRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(FamilyMember::Table)
        .and_where(Expr::col(FamilyMember::Id).eq(id))
        .and_where(Expr::col(FamilyMember::UserId).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, MemberRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

/// Case-insensitive lookup of a member name, ignoring `except_id`.
pub(crate) async fn name_taken(
    pool: &SqlitePool,
    user_id: &str,
    name: &str,
    except_id: Option<&str>,
) -> mealmate_shared::Result<bool> {
    let mut statement = Query::select()
        .column(FamilyMember::Id)
        .from(FamilyMember::Table)
        .and_where(Expr::col(FamilyMember::UserId).eq(user_id))
        .and_where(Expr::cust_with_values(
            "LOWER(\"name\") = LOWER(?)",
            [name.to_owned()],
        ))
        .limit(1)
        .to_owned();

    if let Some(id) = except_id {
        statement.and_where(Expr::col(FamilyMember::Id).ne(id));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (String,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub(crate) async fn create(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
    input: MemberInput,
    now: i64,
) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(FamilyMember::Table)
        .columns(COLUMNS)
        .values_panic([
            id.into(),
            user_id.into(),
            input.name.into(),
            input.age.into(),
            serde_json::to_string(&input.dietary_preferences)?.into(),
            serde_json::to_string(&input.allergies)?.into(),
            serde_json::to_string(&input.dislikes)?.into(),
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
    input: MemberInput,
    now: i64,
) -> mealmate_shared::Result<bool> {
    let statement = Query::update()
        .table(FamilyMember::Table)
        .values([
            (FamilyMember::Name, input.name.into()),
            (FamilyMember::Age, input.age.into()),
            (
                FamilyMember::DietaryPreferences,
                serde_json::to_string(&input.dietary_preferences)?.into(),
            ),
            (
                FamilyMember::Allergies,
                serde_json::to_string(&input.allergies)?.into(),
            ),
            (
                FamilyMember::Dislikes,
                serde_json::to_string(&input.dislikes)?.into(),
            ),
            (FamilyMember::Notes, input.notes.into()),
            (FamilyMember::UpdatedAt, now.into()),
        ])
        .and_where(Expr::col(FamilyMember::Id).eq(id))
        .and_where(Expr::col(FamilyMember::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(
    pool: &SqlitePool,
    id: &str,
    user_id: &str,
) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(FamilyMember::Table)
        .and_where(Expr::col(FamilyMember::Id).eq(id))
        .and_where(Expr::col(FamilyMember::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
