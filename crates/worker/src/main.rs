use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use catalog_worker::config::{poll_interval_from_env, ImportConfig};
use catalog_worker::poller;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "catalog_worker=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ImportConfig::from_env();
    let interval = poll_interval_from_env();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = catalog_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    catalog_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Worker connected to database");

    let cancel = CancellationToken::new();
    let poller_cancel = cancel.clone();
    let handle = tokio::spawn(poller::run(pool, config, interval, poller_cancel));

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl-C handler");
    tracing::info!("Received SIGINT (Ctrl-C), stopping worker");

    cancel.cancel();
    let _ = handle.await;
    tracing::info!("Worker stopped");
}
