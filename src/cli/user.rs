use clap::ValueEnum;
use mealmate::config::Config;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Role {
    User,
    Admin,
    Suspend,
}

#[tracing::instrument(skip(config))]
pub async fn set_role(config: Config, email: String, role: Role) -> anyhow::Result<()> {
    let pool = mealmate::create_pool(&config.database.url, 1).await?;
    let command = mealmate_user::Command::new(mealmate_shared::State::single(pool.clone()));

    let Some(user) = command.find_by_email(email.to_lowercase()).await? else {
        tracing::error!("user {email} not found");
        return Ok(());
    };

    match role {
        Role::User => {
            command
                .set_role(&user.id, mealmate_shared::user::Role::User)
                .await?;
            command.activate(&user.id).await?;
        }
        Role::Admin => {
            command
                .set_role(&user.id, mealmate_shared::user::Role::Admin)
                .await?;
        }
        Role::Suspend => command.suspend(&user.id).await?,
    }

    pool.close().await;

    tracing::info!("{email} updated");

    Ok(())
}
