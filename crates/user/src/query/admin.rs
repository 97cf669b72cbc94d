use mealmate_db::table::User;
use mealmate_shared::{
    Page, Pagination,
    user::{Role, State},
};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;

use crate::repository::{COLUMNS, UserRow};

#[derive(Default)]
pub struct AdminFilter {
    pub role: Option<Role>,
    pub state: Option<State>,
    pub search: Option<String>,
    pub pagination: Pagination,
}

fn apply_filter(statement: &mut SelectStatement, input: &AdminFilter) {
    if let Some(role) = input.role {
        statement.and_where(Expr::col(User::Role).eq(role.to_string()));
    }

    if let Some(state) = input.state {
        statement.and_where(Expr::col(User::State).eq(state.to_string()));
    }

    if let Some(search) = input.search.as_ref().map(|s| s.trim()).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        statement.and_where(
            Expr::col(User::Email)
                .like(pattern.to_owned())
                .or(Expr::col(User::FullName).like(pattern)),
        );
    }
}

/// Accounts for the admin dashboard, newest first.
pub async fn filter(pool: &SqlitePool, input: AdminFilter) -> mealmate_shared::Result<Page<UserRow>> {
    let mut count = Query::select()
        .expr(Func::count(Expr::col(User::Id)))
        .from(User::Table)
        .to_owned();
    apply_filter(&mut count, &input);

    let (sql, values) = count.build_sqlx(SqliteQueryBuilder);
    let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    let mut statement = Query::select()
        .columns(COLUMNS)
        .from(User::Table)
        .order_by(User::CreatedAt, Order::Desc)
        .order_by(User::Id, Order::Desc)
        .limit(input.pagination.limit())
        .offset(input.pagination.offset())
        .to_owned();
    apply_filter(&mut statement, &input);

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let items = sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_all(pool)
        .await?;

    Ok(Page::new(items, total, input.pagination))
}
