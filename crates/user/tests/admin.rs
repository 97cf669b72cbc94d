use mealmate_shared::{
    Pagination,
    user::{Role, State},
};
use mealmate_user::{AdminFilter, FindType};
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn filter_users() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = mealmate_user::Command::new(state.clone());
    let ids = helpers::create_users(&cmd, vec!["john", "albert", "marie", "paul"]).await?;

    cmd.suspend(&ids[1]).await?;
    cmd.set_role(&ids[2], Role::Admin).await?;

    let page = mealmate_user::filter(&state.read_db, AdminFilter::default()).await?;
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 4);

    let page = mealmate_user::filter(
        &state.read_db,
        AdminFilter {
            state: Some(State::Suspended),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, ids[1]);

    let page = mealmate_user::filter(
        &state.read_db,
        AdminFilter {
            role: Some(Role::Admin),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.items[0].id, ids[2]);

    let page = mealmate_user::filter(
        &state.read_db,
        AdminFilter {
            search: Some("PAU".to_owned()),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, ids[3]);

    let page = mealmate_user::filter(
        &state.read_db,
        AdminFilter {
            pagination: Pagination::new(Some(2), Some(3)),
            ..Default::default()
        },
    )
    .await?;
    assert_eq!(page.total, 4);
    assert_eq!(page.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn global_stats() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = mealmate_user::Command::new(state.clone());
    let ids = helpers::create_users(&cmd, vec!["john", "albert", "marie"]).await?;

    cmd.suspend(&ids[0]).await?;
    cmd.set_role(&ids[1], Role::Admin).await?;

    let stats = mealmate_user::global_stats(&state.read_db, mealmate_shared::now()).await?;

    assert_eq!(stats.total_users, 3);
    assert_eq!(stats.active_users, 2);
    assert_eq!(stats.suspended_users, 1);
    assert_eq!(stats.admin_users, 1);
    assert_eq!(stats.new_users_last_30_days, 3);
    assert_eq!(stats.total_recipes, 0);

    Ok(())
}

#[tokio::test]
async fn ensure_root_creates_then_promotes() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.child("db.sqlite3");
    let state = helpers::setup_test_state(path).await?;
    let cmd = mealmate_user::Command::new(state);

    let id = cmd
        .ensure_root("root@mealmate.localhost", "root_password")
        .await?;
    let root = cmd.load(&id).await?;
    assert!(root.is_admin());

    let john = helpers::create_user(&cmd, "john").await?;
    cmd.suspend(&john).await?;
    let promoted = cmd
        .ensure_root("john@mealmate.localhost", "ignored_password")
        .await?;
    assert_eq!(promoted, john);

    let john = cmd
        .find(FindType::Id(john))
        .await?
        .unwrap();
    assert!(john.is_admin());
    assert!(!john.is_suspended());

    Ok(())
}
