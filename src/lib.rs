use std::path::Path;
use std::sync::Arc;

use crate::mail::Mailer;
use crate::model::{DbConnection, ModelManager};
use crate::utils::signal::shutdown_signal;
use crate::{error::AppResult, web::AppState};
use axum::Router;
use sqlx::migrate::Migrator;
use tokio::net::TcpListener;

pub mod config;
pub use config::{Config, ConfigError, ConfigResult};

pub mod auth;
pub mod certificates;
pub mod documents;
pub mod error;
pub mod mail;
pub mod model;
pub mod quiz;
pub mod training;
pub mod utils;
pub mod web;

pub static APPLICATION_NAME: &str = "ergo";

pub async fn build_server() -> AppResult<(AppState, Router)> {
    let use_local = cfg!(debug_assertions);
    let config = config::Config::get_or_init(use_local).await;
    let db = DbConnection::connect(config.app().database_uri())?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    tracing::debug!("applying migrations...");
    migrator.run(db.pool()).await?;

    let mailer = mail::build_mailer(config.mail())?;
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, mailer, config);
    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

/// Builds the app on an existing pool. Without a mailer the configured backend is used.
pub async fn build_server_with_pool(
    db: DbConnection,
    mailer: Option<Arc<dyn Mailer>>,
) -> AppResult<(AppState, Router)> {
    let config = config::Config::get_or_init(true).await;

    let mailer = match mailer {
        Some(mailer) => mailer,
        None => mail::build_mailer(config.mail())?,
    };
    let mm = ModelManager::new(db);
    let state = AppState::new(mm, mailer, config);
    let app = web::routes::build_app(state.clone());
    Ok((state, app))
}

#[tracing::instrument]
pub async fn setup_workers() -> AppResult<()> {
    let (state, app) = build_server().await?;
    let config = state.config();
    let listener = TcpListener::bind(config.host().bindto()).await?;

    tracing::info!(
        "{APPLICATION_NAME} is starting at: {}",
        config.host().bindto()
    );
    let axum_handle = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

    axum_handle.await?;
    Ok(())
}

pub fn setup_trace() {
    use tracing_error::ErrorLayer;
    use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

    // load .env file for RUST_LOG etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .with(ErrorLayer::default())
        .init();

    tracing::debug!("tracing initialized.");
}

#[tracing::instrument]
pub async fn run() -> AppResult<()> {
    setup_trace();
    setup_workers().await?;
    Ok(())
}
