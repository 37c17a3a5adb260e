mod handlers;
mod routes;

pub use routes::{ApiResponse, PaginationParams};

use crate::config::Config;
use crate::db::{Database, DbPool};
use crate::external::geocoding::ReverseGeocoder;
use crate::external::storage::ObjectStore;
use anyhow::Result;
use axum::{
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub store: Arc<dyn ObjectStore>,
    pub geocoder: Arc<dyn ReverseGeocoder>,
}

/// Start the API server
pub async fn start_api_server(
    db: Arc<Database>,
    store: Arc<dyn ObjectStore>,
    geocoder: Arc<dyn ReverseGeocoder>,
) -> Result<()> {
    let config = Config::get();

    let state = AppState {
        pool: db.get_pool().clone(),
        store,
        geocoder,
    };

    // Set up CORS
    let cors = if config.api.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::permissive()
    };

    // Create router with all routes
    let app = Router::new()
        // General routes
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::get_metrics))
        // Profile routes
        .route(
            "/api/profiles",
            get(handlers::profiles::get_profiles).post(handlers::profiles::create_profile),
        )
        .route(
            "/api/profiles/:user_id",
            get(handlers::profiles::get_profile).put(handlers::profiles::update_profile),
        )
        .route(
            "/api/profiles/:user_id/friends",
            get(handlers::friendships::get_friends),
        )
        // Friendship routes
        .route("/api/friendships", post(handlers::friendships::request_friendship))
        .route(
            "/api/friendships/:id/accept",
            post(handlers::friendships::accept_friendship),
        )
        // Photo and feed routes
        .route("/api/feed", get(handlers::photos::get_feed))
        .route("/api/photos", post(handlers::photos::create_photo))
        .route(
            "/api/photos/:id",
            get(handlers::photos::get_photo).delete(handlers::photos::delete_photo),
        )
        .route(
            "/api/photos/:id/comments",
            get(handlers::photos::get_comments).post(handlers::photos::create_comment),
        )
        .route("/api/photos/:id/species", put(handlers::dex::reassign_species))
        .route("/api/photos/:id/hide", post(handlers::dex::hide_from_species_view))
        .route("/api/photos/:id/privacy", put(handlers::photos::set_privacy))
        .route(
            "/api/photos/:id/feed-visibility",
            put(handlers::photos::set_feed_visibility),
        )
        // Dex routes
        .route("/api/dex/:user_id", get(handlers::dex::get_dex))
        .route(
            "/api/dex/:user_id/species/:species_id",
            get(handlers::dex::get_species_photos),
        )
        .route(
            "/api/dex/:user_id/species/:species_id/top",
            put(handlers::dex::set_top_photo),
        )
        // Leaderboard routes
        .route("/api/leaderboard", get(handlers::leaderboard::get_leaderboard))
        // Quest routes
        .route(
            "/api/quests",
            get(handlers::quests::get_quests).post(handlers::quests::create_quest),
        )
        .route("/api/quests/:id", get(handlers::quests::get_quest))
        .route("/api/quests/:id/entries", post(handlers::quests::submit_entry))
        .route("/api/quests/:id/votes", post(handlers::quests::cast_vote))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Get bind address
    let addr = format!("{}:{}", config.api.host, config.api.port).parse::<SocketAddr>()?;

    // Start server
    info!("Starting API server on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
