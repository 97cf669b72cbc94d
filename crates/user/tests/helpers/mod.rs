use std::{path::PathBuf, str::FromStr};

use mealmate_shared::State;
use mealmate_user::RegisterInput;
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;
    mealmate_db::migrate(&pool).await?;

    Ok(State::single(pool))
}

#[allow(dead_code)]
pub async fn create_user(
    cmd: &mealmate_user::Command,
    name: impl Into<String>,
) -> anyhow::Result<String> {
    let ids = create_users(cmd, vec![name]).await?;

    Ok(ids.first().unwrap().to_owned())
}

#[allow(dead_code)]
pub async fn create_users(
    cmd: &mealmate_user::Command,
    names: impl IntoIterator<Item = impl Into<String>>,
) -> anyhow::Result<Vec<String>> {
    let mut ids = vec![];
    for name in names.into_iter() {
        let name = name.into();
        let id = cmd
            .register(RegisterInput {
                email: format!("{name}@mealmate.localhost"),
                password: "my_password".to_owned(),
                full_name: Some(name.to_owned()),
            })
            .await?;
        ids.push(id);
    }

    Ok(ids)
}
