use std::str::FromStr;

use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use temp_dir::TempDir;

async fn setup(dir: &TempDir) -> anyhow::Result<SqlitePool> {
    let path = dir.child("db.sqlite3");
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;
    mealmate_db::migrate(&pool).await?;

    Ok(pool)
}

#[tokio::test]
async fn creates_every_table() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = setup(&dir).await?;

    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE '%migrator%' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(&pool)
    .await?;
    let tables = tables.into_iter().map(|t| t.0).collect::<Vec<_>>();

    assert_eq!(
        tables,
        vec![
            "family_member",
            "ingredient",
            "meal_plan",
            "meal_plan_entry",
            "pantry_item",
            "recipe",
            "recipe_rating",
            "user",
        ]
    );

    Ok(())
}

#[tokio::test]
async fn migrating_twice_is_a_noop() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = setup(&dir).await?;

    mealmate_db::migrate(&pool).await?;

    Ok(())
}

#[tokio::test]
async fn deleting_user_cascades() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let pool = setup(&dir).await?;

    sqlx::query(
        r#"INSERT INTO "user" (id, email, password, household_size, role, state, created_at, updated_at)
        VALUES ('u1', 'john@mealmate.localhost', 'x', 2, 'user', 'active', 0, 0)"#,
    )
    .execute(&pool)
    .await?;
    sqlx::query(
        r#"INSERT INTO family_member (id, user_id, name, created_at, updated_at)
        VALUES ('f1', 'u1', 'Anna', 0, 0)"#,
    )
    .execute(&pool)
    .await?;

    let duplicate = sqlx::query(
        r#"INSERT INTO family_member (id, user_id, name, created_at, updated_at)
        VALUES ('f2', 'u1', 'ANNA', 0, 0)"#,
    )
    .execute(&pool)
    .await;
    assert!(duplicate.is_err());

    sqlx::query(r#"DELETE FROM "user" WHERE id = 'u1'"#)
        .execute(&pool)
        .await?;

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM family_member")
        .fetch_one(&pool)
        .await?;
    assert_eq!(count, 0);

    Ok(())
}
