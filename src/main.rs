use std::sync::Arc;

use quickdesk::config::ServerConfig;
use quickdesk::db::{self, PgStore};
use quickdesk::routes;
use quickdesk::services::csrf::CsrfSecret;
use quickdesk::services::store::{MemoryStore, TicketStore};
use quickdesk::state::AppState;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_env("QUICKDESK_LOG").unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env().expect("invalid server configuration");

    let store: Arc<dyn TicketStore> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed");
            Arc::new(PgStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; serving from an in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    let csrf = match &config.csrf_secret {
        Some(secret) => CsrfSecret::from_secret(secret),
        None => {
            warn!("CSRF_SECRET not set; generated a per-process secret");
            CsrfSecret::generate()
        }
    };

    let app = routes::app(AppState::new(store, csrf));
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .expect("failed to bind");

    info!(port = config.port, "quickdesk listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}
