use mealmate_db::table::{Ingredient, PantryItem};
use mealmate_shared::pantry::{IngredientCategory, Unit};
use sea_query::{
    Alias, Expr, ExprTrait, OnConflict, Order, Query, SelectStatement, SqliteQueryBuilder,
};
use sea_query_sqlx::SqlxBinder;
use serde::{Deserialize, Serialize};
use sqlx::{SqlitePool, prelude::FromRow};
use validator::Validate;

/// Upper bound that also rules out infinite and NaN quantities.
pub const MAX_QUANTITY: f64 = 1_000_000.0;

#[derive(FromRow, Serialize, Clone, Debug)]
pub struct PantryItemRow {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub ingredient_id: String,
    pub name: String,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub category: sqlx::types::Text<IngredientCategory>,
    pub quantity: f64,
    #[serde(serialize_with = "mealmate_shared::serialize_text")]
    pub unit: sqlx::types::Text<Unit>,
    pub expires_on: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl PantryItemRow {
    pub fn is_out(&self) -> bool {
        self.quantity <= 0.0
    }
}

#[derive(Default, Deserialize, Clone, Debug)]
pub struct PantryFilter {
    pub search: Option<String>,
    pub category: Option<IngredientCategory>,
}

#[derive(Validate, Deserialize, Clone, Debug)]
pub struct AddItemInput {
    #[validate(length(min = 1, max = 100), custom(function = "mealmate_shared::validate_not_blank"))]
    pub name: String,
    #[validate(range(min = 0.0, max = MAX_QUANTITY))]
    pub quantity: f64,
    #[serde(default)]
    pub unit: Unit,
    pub category: Option<IngredientCategory>,
    #[validate(custom(function = "mealmate_shared::validate_date"))]
    pub expires_on: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Validate, Deserialize, Default, Clone, Debug)]
pub struct UpdateItemInput {
    #[validate(range(min = 0.0, max = MAX_QUANTITY))]
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    /// `Some(None)` clears the expiry date.
    #[serde(default, with = "double_option")]
    pub expires_on: Option<Option<String>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer).map(Some)
    }
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            (PantryItem::Table, PantryItem::Id),
            (PantryItem::Table, PantryItem::UserId),
            (PantryItem::Table, PantryItem::IngredientId),
        ])
        .column((Ingredient::Table, Ingredient::Name))
        .column((Ingredient::Table, Ingredient::Category))
        .columns([
            (PantryItem::Table, PantryItem::Quantity),
            (PantryItem::Table, PantryItem::Unit),
            (PantryItem::Table, PantryItem::ExpiresOn),
            (PantryItem::Table, PantryItem::Notes),
            (PantryItem::Table, PantryItem::CreatedAt),
            (PantryItem::Table, PantryItem::UpdatedAt),
        ])
        .from(PantryItem::Table)
        .inner_join(
            Ingredient::Table,
            Expr::col((Ingredient::Table, Ingredient::Id))
                .equals((PantryItem::Table, PantryItem::IngredientId)),
        )
        .to_owned()
}

pub(crate) async fn list(
    pool: &SqlitePool,
    user_id: &str,
    filter: &PantryFilter,
) -> mealmate_shared::Result<Vec<PantryItemRow>> {
    let mut statement = select()
        .and_where(Expr::col((PantryItem::Table, PantryItem::UserId)).eq(user_id))
        .order_by((Ingredient::Table, Ingredient::Name), Order::Asc)
        .order_by((PantryItem::Table, PantryItem::Unit), Order::Asc)
        .to_owned();

    if let Some(search) = filter
        .search
        .as_deref()
        .map(mealmate_shared::pantry::normalize_name)
        .filter(|s| !s.is_empty())
    {
        statement.and_where(Expr::col((Ingredient::Table, Ingredient::Name)).like(format!("%{search}%")));
    }

    if let Some(category) = filter.category {
        statement.and_where(Expr::col((Ingredient::Table, Ingredient::Category)).eq(category.to_string()));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PantryItemRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

/// Items with an expiry on or before `until`, soonest first.
pub(crate) async fn expiring(
    pool: &SqlitePool,
    user_id: &str,
    until: &str,
) -> mealmate_shared::Result<Vec<PantryItemRow>> {
    let statement = select()
        .and_where(Expr::col((PantryItem::Table, PantryItem::UserId)).eq(user_id))
        .and_where(Expr::col((PantryItem::Table, PantryItem::ExpiresOn)).is_not_null())
        .and_where(Expr::col((PantryItem::Table, PantryItem::ExpiresOn)).lte(until))
        .order_by((PantryItem::Table, PantryItem::ExpiresOn), Order::Asc)
        .order_by((Ingredient::Table, Ingredient::Name), Order::Asc)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PantryItemRow, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

pub(crate) async fn find(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
) -> mealmate_shared::Result<Option<PantryItemRow>> {
    let statement = select()
        .and_where(Expr::col((PantryItem::Table, PantryItem::Id)).eq(id))
        .and_where(Expr::col((PantryItem::Table, PantryItem::UserId)).eq(user_id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PantryItemRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) async fn find_by_ingredient(
    pool: &SqlitePool,
    user_id: &str,
    ingredient_id: &str,
    unit: Unit,
) -> mealmate_shared::Result<Option<PantryItemRow>> {
    let statement = select()
        .and_where(Expr::col((PantryItem::Table, PantryItem::UserId)).eq(user_id))
        .and_where(Expr::col((PantryItem::Table, PantryItem::IngredientId)).eq(ingredient_id))
        .and_where(Expr::col((PantryItem::Table, PantryItem::Unit)).eq(unit.to_string()))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, PantryItemRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct CreateInput {
    pub id: String,
    pub user_id: String,
    pub ingredient_id: String,
    pub quantity: f64,
    pub unit: Unit,
    pub expires_on: Option<String>,
    pub notes: Option<String>,
    pub now: i64,
}

/// Inserts the item or, when the user already stocks this ingredient in this
/// unit, adds the quantity to that row and keeps the later expiry.
pub(crate) async fn upsert(pool: &SqlitePool, input: CreateInput) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(PantryItem::Table)
        .columns([
            PantryItem::Id,
            PantryItem::UserId,
            PantryItem::IngredientId,
            PantryItem::Quantity,
            PantryItem::Unit,
            PantryItem::ExpiresOn,
            PantryItem::Notes,
            PantryItem::CreatedAt,
            PantryItem::UpdatedAt,
        ])
        .values_panic([
            input.id.into(),
            input.user_id.into(),
            input.ingredient_id.into(),
            input.quantity.into(),
            input.unit.to_string().into(),
            input.expires_on.into(),
            input.notes.into(),
            input.now.into(),
            input.now.into(),
        ])
        .on_conflict(
            OnConflict::columns([PantryItem::UserId, PantryItem::IngredientId, PantryItem::Unit])
                .value(
                    PantryItem::Quantity,
                    Expr::col(PantryItem::Quantity).add(Expr::col((excluded(), PantryItem::Quantity))),
                )
                .value(
                    PantryItem::ExpiresOn,
                    Expr::cust(
                        r#"COALESCE(MAX("expires_on", "excluded"."expires_on"), "expires_on", "excluded"."expires_on")"#,
                    ),
                )
                .value(
                    PantryItem::Notes,
                    Expr::cust(r#"COALESCE("excluded"."notes", "notes")"#),
                )
                .update_column(PantryItem::UpdatedAt)
                .to_owned(),
        )
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

fn excluded() -> Alias {
    Alias::new("excluded")
}

#[derive(Default)]
pub(crate) struct UpdateInput {
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub expires_on: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

pub(crate) async fn update(
    pool: &SqlitePool,
    user_id: &str,
    id: &str,
    input: UpdateInput,
) -> mealmate_shared::Result<bool> {
    let mut statement = Query::update()
        .table(PantryItem::Table)
        .value(PantryItem::UpdatedAt, mealmate_shared::now())
        .and_where(Expr::col(PantryItem::Id).eq(id))
        .and_where(Expr::col(PantryItem::UserId).eq(user_id))
        .to_owned();

    if let Some(quantity) = input.quantity {
        statement.value(PantryItem::Quantity, quantity);
    }

    if let Some(unit) = input.unit {
        statement.value(PantryItem::Unit, unit.to_string());
    }

    if let Some(expires_on) = input.expires_on {
        statement.value(PantryItem::ExpiresOn, expires_on);
    }

    if let Some(notes) = input.notes {
        statement.value(PantryItem::Notes, notes);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, user_id: &str, id: &str) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(PantryItem::Table)
        .and_where(Expr::col(PantryItem::Id).eq(id))
        .and_where(Expr::col(PantryItem::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}
