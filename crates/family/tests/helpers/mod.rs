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

pub async fn create_user(state: &State, name: &str) -> anyhow::Result<String> {
    let cmd = mealmate_user::Command::new(state.clone());
    let id = cmd
        .register(RegisterInput {
            email: format!("{name}@mealmate.localhost"),
            password: "my_password".to_owned(),
            full_name: Some(name.to_owned()),
        })
        .await?;

    Ok(id)
}
