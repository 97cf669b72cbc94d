use mealmate_db::table::User;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Serialize;
use sqlx::{SqlitePool, prelude::FromRow};

use mealmate_shared::user::{Role, State};

#[derive(FromRow, Clone, Debug)]
pub struct UserRow {
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub household_size: i64,
    pub role: sqlx::types::Text<Role>,
    pub state: sqlx::types::Text<State>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRow {
    pub fn is_admin(&self) -> bool {
        self.role.0 == Role::Admin
    }

    pub fn is_suspended(&self) -> bool {
        self.state.0 == State::Suspended
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id.to_owned(),
            email: self.email.to_owned(),
            full_name: self.full_name.to_owned(),
            household_size: self.household_size,
            role: self.role.0,
            state: self.state.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public shape of an account, without the password hash.
#[derive(Serialize, Clone, Debug)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub household_size: i64,
    pub role: Role,
    pub state: State,
    pub created_at: i64,
    pub updated_at: i64,
}

pub enum FindType {
    Id(String),
    Email(String),
}

pub(crate) const COLUMNS: [User; 9] = [
    User::Id,
    User::Email,
    User::Password,
    User::FullName,
    User::HouseholdSize,
    User::Role,
    User::State,
    User::CreatedAt,
    User::UpdatedAt,
];

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> mealmate_shared::Result<Option<UserRow>> {
    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(User::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(User::Id).eq(id)),
        FindType::Email(email) => {
            statement.and_where(Expr::col(User::Email).eq(normalize_email(&email)))
        }
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct CreateInput {
    pub id: String,
    pub email: String,
    pub password: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub now: i64,
}

pub(crate) async fn create(pool: &SqlitePool, input: CreateInput) -> mealmate_shared::Result<()> {
    let statement = Query::insert()
        .into_table(User::Table)
        .columns([
            User::Id,
            User::Email,
            User::Password,
            User::FullName,
            User::HouseholdSize,
            User::Role,
            User::State,
            User::CreatedAt,
            User::UpdatedAt,
        ])
        .values_panic([
            input.id.into(),
            normalize_email(&input.email).into(),
            input.password.into(),
            input.full_name.into(),
            2.into(),
            input.role.to_string().into(),
            State::Active.to_string().into(),
            input.now.into(),
            input.now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

#[derive(Default)]
pub struct UpdateInput {
    pub id: String,
    pub full_name: Option<Option<String>>,
    pub household_size: Option<i64>,
    pub password: Option<String>,
    pub role: Option<Role>,
    pub state: Option<State>,
}

pub async fn update(pool: &SqlitePool, input: UpdateInput) -> mealmate_shared::Result<bool> {
    let mut statement = Query::update()
        .table(User::Table)
        .value(User::UpdatedAt, mealmate_shared::now())
        .and_where(Expr::col(User::Id).eq(input.id))
        .to_owned();

    if let Some(full_name) = input.full_name {
        statement.value(User::FullName, full_name);
    }

    if let Some(household_size) = input.household_size {
        statement.value(User::HouseholdSize, household_size);
    }

    if let Some(password) = input.password {
        statement.value(User::Password, password);
    }

    if let Some(role) = input.role {
        statement.value(User::Role, role.as_ref());
    }

    if let Some(state) = input.state {
        statement.value(User::State, state.as_ref());
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) async fn delete(pool: &SqlitePool, id: impl Into<String>) -> mealmate_shared::Result<bool> {
    let statement = Query::delete()
        .from_table(User::Table)
        .and_where(Expr::col(User::Id).eq(id.into()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected() > 0)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
