use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use snippetbox::cli::Args;
use snippetbox::config::AppConfig;
use snippetbox::database::models::{PgSnippetModel, PgUserModel};
use snippetbox::database::{manager, PgSessionStore};
use snippetbox::routes::routes;
use snippetbox::state::AppState;
use snippetbox::templates::TemplateCache;

const SESSION_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, APP_ENV, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("snippetbox=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = AppConfig::from_env().with_args(&args);
    tracing::info!(environment = ?config.environment, debug = config.server.debug, "starting snippetbox");

    let pool = manager::connect(&config.database)
        .await
        .context("failed to open database")?;
    manager::migrate(&pool).await.context("failed to run migrations")?;

    let store = PgSessionStore::new(pool.clone());
    tokio::spawn(delete_expired_sessions(store.clone()));

    let users = PgUserModel::new(pool.clone(), config.security.bcrypt_cost).await?;
    let templates = TemplateCache::new().context("failed to compile templates")?;
    let addr = config.server.addr.clone();

    let state = AppState::new(
        Arc::new(PgSnippetModel::new(pool.clone())),
        Arc::new(users),
        templates,
        config,
    );
    let app = routes(state, store);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "starting server");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    pool.close().await;
    tracing::info!("server stopped");
    Ok(())
}

async fn delete_expired_sessions(store: PgSessionStore) {
    let mut interval = tokio::time::interval(SESSION_CLEANUP_INTERVAL);
    loop {
        interval.tick().await;
        match store.delete_expired().await {
            Ok(0) => {}
            Ok(n) => tracing::debug!(deleted = n, "removed expired sessions"),
            Err(e) => tracing::warn!(error = %e, "failed to remove expired sessions"),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
