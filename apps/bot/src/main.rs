use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use motbot::bot::Dispatcher;
use motbot::config;
use motbot::db;
use motbot::error::AppError;
use motbot::services::{LookupService, SqliteUsageRecorder, UsageAttributor, UsageRecorder};
use motbot::sources::{MotClient, VesClient};
use motbot::transport::{TelegramTransport, Transport};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    if dotenvy::dotenv().is_err() {
        eprintln!("No .env file found, using environment variables");
    }

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    if config.admins.is_empty() {
        log::warn!("ADMIN_LIST is empty, /stats is disabled for everyone");
    }

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Upstream clients
    let mot = MotClient::new(&config.mot).map_err(|e| {
        log::error!("Invalid MOT_BASE_URL: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let ves = VesClient::new(&config.ves);

    let telegram = TelegramTransport::new(&config.telegram);
    let transport: Arc<dyn Transport> = Arc::new(telegram.clone());
    let recorder: Arc<dyn UsageRecorder> = Arc::new(SqliteUsageRecorder::new(db_pool.clone()));

    let lookup = LookupService::new(
        Arc::new(mot),
        Arc::new(ves),
        recorder.clone(),
        UsageAttributor::new(transport.clone(), config.group_attribution),
    );
    let dispatcher = Dispatcher::new(transport, lookup, recorder, config.admins.clone());

    // Cancel the dispatcher on Ctrl+C / SIGTERM
    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping bot...");
        shutdown.cancel();
    });

    log::info!("Starting bot...");
    match dispatcher.run(&cancel, telegram.updates()).await {
        Ok(()) | Err(AppError::Cancelled) => log::info!("Bot stopped"),
        Err(e) => log::error!("Bot stopped with error: {}", e),
    }

    db_pool.close().await;
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                log::error!("Failed to install Ctrl+C handler: {}", e);
                // Wait forever if signal handler fails
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
