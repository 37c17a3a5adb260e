// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde_json::json;
use tracing::error;

use crate::api::AppState;
use crate::engine::ranking::{compute_leaderboard, PhotoRecord, ProfileRecord};
use crate::models::profile::PublicProfile;
use crate::schema::{photos, user_profiles_public};

/// Compute the leaderboard from the current snapshot. Derived on every
/// request; on a fetch failure nothing partial is served.
pub async fn get_leaderboard(State(state): State<AppState>) -> impl IntoResponse {
    let unavailable = || {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Leaderboard is temporarily unavailable",
                "entries": [],
            })),
        )
    };

    let mut conn = match state.pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Database connection error: {}", e);
            return unavailable();
        }
    };

    // Profile fetch order is the final tie-break, so the query pins it to
    // signup order to keep rankings deterministic.
    let profiles = match user_profiles_public::table
        .order(user_profiles_public::created_at.asc())
        .load::<PublicProfile>(&mut conn)
        .await
    {
        Ok(profiles) => profiles,
        Err(e) => {
            error!("Failed to fetch profiles for leaderboard: {}", e);
            return unavailable();
        }
    };

    let photo_rows = match photos::table
        .select((
            photos::owner_user_id,
            photos::species_id,
            photos::hidden_from_feed,
        ))
        .load::<(String, String, bool)>(&mut conn)
        .await
    {
        Ok(rows) => rows,
        Err(e) => {
            error!("Failed to fetch photos for leaderboard: {}", e);
            return unavailable();
        }
    };

    let profile_records: Vec<ProfileRecord> = profiles
        .into_iter()
        .map(|p| ProfileRecord {
            user_id: p.user_id,
            display_name: p.display_name,
        })
        .collect();
    let photo_records: Vec<PhotoRecord> = photo_rows
        .into_iter()
        .map(|(owner_user_id, species_id, hidden_from_feed)| PhotoRecord {
            owner_user_id,
            species_id,
            hidden_from_feed,
        })
        .collect();

    let entries = compute_leaderboard(&profile_records, &photo_records);

    (StatusCode::OK, Json(json!({ "entries": entries })))
}
