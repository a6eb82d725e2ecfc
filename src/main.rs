use anyhow::Result;
use axum::Router;
use std::{fs, io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

use config::RunMode;
use models::record::DownloadRecord;
use services::{
    download_service::DownloadService, record_service::RecordService,
    storage_service::LocalStorage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting attachment-server with config: {:?}", cfg);

    // --- Ensure storage directory exists ---
    if !Path::new(&cfg.storage_dir).exists() {
        fs::create_dir_all(&cfg.storage_dir)?;
        tracing::info!("Created storage directory at {}", cfg.storage_dir);
    }

    // --- Initialize SQLite connection ---
    let db = Arc::new(db::connect(&cfg.database_url).await?);

    // --- Operator modes ---
    match mode {
        RunMode::Migrate => {
            db::run_migrations(&db).await?;
            tracing::info!("Database migration complete.");
            return Ok(());
        }
        RunMode::Register(path) => {
            let record = register_record(&db, &path).await?;
            tracing::info!("Registered download record {} -> {}", record.id, path);
            println!("{}", record.id);
            return Ok(());
        }
        RunMode::Serve => {}
    }

    // --- Initialize core service ---
    let storage = LocalStorage::new(&cfg.storage_dir);
    let service = DownloadService::new(db.clone(), storage, cfg.record_id.into());

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(service);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Insert a record for `path`, applying the schema first so a fresh
/// database does not need a separate `--migrate` run.
async fn register_record(db: &Arc<sqlx::SqlitePool>, path: &str) -> Result<DownloadRecord> {
    db::run_migrations(db).await?;
    let record = RecordService::new(db.clone()).register(Some(path)).await?;
    Ok(record)
}
