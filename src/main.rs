use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use birddex::api;
use birddex::config::Config;
use birddex::db::init_database;
use birddex::external::geocoding::{NullGeocoder, ReverseGeocoder};
use birddex::external::storage::{MemoryStore, ObjectStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,birddex=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    // Initialize database
    let db = Arc::new(init_database().await?);
    info!("Connected to database");

    // Collaborators: the in-process store backs development; production
    // deployments swap in a provider-backed ObjectStore implementation,
    // and a real reverse geocoder replaces the null one.
    let store: Arc<dyn ObjectStore> = Arc::new(MemoryStore::new(&config.storage.public_base_url));
    if let Err(e) = store
        .create_bucket(&config.storage.photo_bucket, false, &[])
        .await
    {
        error!("Failed to create photo bucket: {}", e);
    }
    let geocoder: Arc<dyn ReverseGeocoder> = Arc::new(NullGeocoder);

    // Run the API server until a shutdown signal arrives
    tokio::select! {
        result = api::start_api_server(db, store, geocoder) => {
            if let Err(e) = result {
                error!("API server error: {}", e);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, initiating graceful shutdown");
        }
    }

    info!("BirdDex shutdown complete");
    Ok(())
}
