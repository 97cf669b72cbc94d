use mealmate_db::table::Ingredient;
use mealmate_shared::pantry::{IngredientCategory, normalize_name};
use sea_query::{Expr, ExprTrait, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow};
use ulid::Ulid;

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct IngredientRow {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub category: sqlx::types::Text<IngredientCategory>,
    pub created_at: i64,
}

const COLUMNS: [Ingredient; 4] = [
    Ingredient::Id,
    Ingredient::Name,
    Ingredient::Category,
    Ingredient::CreatedAt,
];

/// Prefix matches first, then anything containing the query.
pub async fn search_ingredients(
    pool: &SqlitePool,
    query: &str,
    limit: u64,
) -> mealmate_shared::Result<Vec<IngredientRow>> {
    let query = normalize_name(query);
    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(Ingredient::Table)
        .limit(limit.clamp(1, 50))
        .to_owned();

    if !query.is_empty() {
        statement
            .and_where(Expr::col(Ingredient::Name).like(format!("%{query}%")))
            .order_by_expr(
                Expr::cust_with_values(
                    "CASE WHEN \"name\" LIKE ? THEN 0 ELSE 1 END",
                    [format!("{query}%")],
                ),
                Order::Asc,
            );
    }

    statement.order_by(Ingredient::Name, Order::Asc);

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, IngredientRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find_by_name(
    pool: &SqlitePool,
    name: &str,
) -> mealmate_shared::Result<Option<IngredientRow>> {
    let statement = Query::select()
        .columns(COLUMNS)
        .from(Ingredient::Table)
        .and_where(Expr::col(Ingredient::Name).eq(normalize_name(name)))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, IngredientRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

/// Returns the catalog entry for `name`, inserting it on first use.
///
/// A known ingredient still filed under `Other` takes the given category.
pub async fn find_or_create_ingredient(
    pool: &SqlitePool,
    name: &str,
    category: Option<IngredientCategory>,
) -> mealmate_shared::Result<IngredientRow> {
    let name = normalize_name(name);
    if name.is_empty() {
        mealmate_shared::user!("Ingredient name is required");
    }

    let statement = Query::insert()
        .into_table(Ingredient::Table)
        .columns(COLUMNS)
        .values_panic([
            Ulid::new().to_string().into(),
            name.to_owned().into(),
            category.unwrap_or_default().to_string().into(),
            mealmate_shared::now().into(),
        ])
        .on_conflict(OnConflict::column(Ingredient::Name).do_nothing().to_owned())
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    let Some(mut ingredient) = find_by_name(pool, &name).await? else {
        mealmate_shared::server!("ingredient '{name}' vanished after insert");
    };

    if let Some(category) = category.filter(|c| {
        *c != IngredientCategory::Other && ingredient.category.0 == IngredientCategory::Other
    }) {
        let statement = Query::update()
            .table(Ingredient::Table)
            .value(Ingredient::Category, category.to_string())
            .and_where(Expr::col(Ingredient::Id).eq(ingredient.id.to_owned()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(pool).await?;

        ingredient.category = sqlx::types::Text(category);
    }

    Ok(ingredient)
}
