use mimalloc::MiMalloc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use traintrack_auth::config::{CONFIG, DEFAULT_JWT_SECRET};
use traintrack_auth::db::AccountStore;
use traintrack_auth::router::{AppState, auth_router};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &*CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    if cfg.jwt_secret == DEFAULT_JWT_SECRET {
        warn!("TRAINTRACK_JWT_SECRET is unset; session tokens use the development default");
    }

    info!(
        database_url = %cfg.database_url,
        frontend_url = %cfg.frontend_url,
        public_url = %cfg.public_url,
        google_sso = cfg.google_client_id.is_some(),
        github_sso = cfg.github_client_id.is_some(),
        loglevel = %cfg.loglevel,
    );

    let connect_opts =
        SqliteConnectOptions::from_str(cfg.database_url.as_str())?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    let store = AccountStore::new(pool);
    store.init_schema().await?;

    let state = AppState::new(store);
    let app = auth_router(state);

    let listener = TcpListener::bind(cfg.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    info!("shutdown signal received");
}
