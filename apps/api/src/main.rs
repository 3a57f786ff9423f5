mod config;
mod db;
mod errors;
mod location;
mod profile;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, ProfileBackend};
use crate::db::create_pool;
use crate::location::ReferenceData;
use crate::profile::document::DocumentProfileStore;
use crate::profile::memory::MemoryProfileStore;
use crate::profile::postgres::PgProfileStore;
use crate::profile::ProfileStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first so RUST_LOG from .env reaches the subscriber
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FastLabor API v{}", env!("CARGO_PKG_VERSION"));

    // Reference tables are required before anything can be served
    let reference = ReferenceData::load_dir(&config.reference_data_dir).with_context(|| {
        format!(
            "Failed to load reference data from {}",
            config.reference_data_dir.display()
        )
    })?;

    let profiles = build_profile_store(&config).await?;
    info!("Profile store initialized ({})", config.profile_backend.as_str());

    let state = AppState {
        reference: Arc::new(reference),
        profiles,
        config: Arc::new(config.clone()),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the profile backend selected by PROFILE_STORE.
async fn build_profile_store(config: &Config) -> Result<Arc<dyn ProfileStore>> {
    let store: Arc<dyn ProfileStore> = match config.profile_backend {
        ProfileBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres profile store")?;
            let pool = create_pool(url, config.database_max_connections).await?;
            Arc::new(PgProfileStore::new(pool))
        }
        ProfileBackend::Document => {
            let url = config
                .document_store_url
                .as_deref()
                .context("DOCUMENT_STORE_URL is required for the document profile store")?;
            let api_key = config
                .document_store_api_key
                .clone()
                .context("DOCUMENT_STORE_API_KEY is required for the document profile store")?;
            Arc::new(DocumentProfileStore::new(
                url,
                api_key,
                config.profile_fetch_timeout,
            )?)
        }
        ProfileBackend::Memory => Arc::new(MemoryProfileStore::new()),
    };
    Ok(store)
}
