use std::sync::Arc;

use anyhow::Result;
use mealmate::{AppState, config::Config};
use mealmate_assistant::{Assistant, CompletionProvider, OpenAiClient, RequestQueue};

fn assistant(config: &Config) -> Result<Assistant> {
    let queue = RequestQueue::new(config.ai.max_concurrency);

    let Some(client_config) = config.ai.client_config() else {
        tracing::warn!("no AI API key configured, recommendations are disabled");
        return Ok(Assistant::new(None, queue));
    };

    let provider: Arc<dyn CompletionProvider> = Arc::new(OpenAiClient::new(client_config)?);
    tracing::info!(model = %provider.model(), "AI assistant enabled");

    Ok(Assistant::new(Some(provider), queue))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(err = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(err = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Starting graceful shutdown...");
}

pub async fn serve(
    config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting mealmate server...");

    let host = host_override.unwrap_or(config.server.host.to_owned());
    let port = port_override.unwrap_or(config.server.port);

    // Single writer connection, created first so the file exists for readers
    let write_pool = mealmate::create_write_pool(&config.database.url).await?;
    mealmate_db::migrate(&write_pool).await?;

    let read_pool =
        mealmate::create_read_pool(&config.database.url, config.database.max_connections).await?;

    let state = mealmate_shared::State {
        read_db: read_pool.clone(),
        write_db: write_pool.clone(),
    };

    if let Some(root) = &config.root {
        let command = mealmate_user::Command::new(state.clone());
        let id = command.ensure_root(&root.email, &root.password).await?;
        tracing::info!(user_id = %id, "root account ready");
    }

    let assistant = assistant(&config)?;
    let app = mealmate::router(AppState::new(config, state, assistant)?);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing database pools...");
    read_pool.close().await;
    write_pool.close().await;
    tracing::info!("Graceful shutdown complete");

    Ok(())
}
