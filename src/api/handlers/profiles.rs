// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use tracing::error;

use crate::api::routes::{ApiResponse, PaginationParams};
use crate::api::AppState;
use crate::error::DomainError;
use crate::models::profile::{NewUserProfile, PublicProfile, UpdateUserProfile, UserProfile};
use crate::schema::{user_profiles, user_profiles_public};

#[derive(Debug, Deserialize)]
pub struct ViewerQuery {
    pub viewer: Option<String>,
}

/// Get a list of profiles with pagination (public projection)
pub async fn get_profiles(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> impl IntoResponse {
    let mut conn = match state.pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Database connection error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Database error: {}", e)
                })),
            );
        }
    };

    let profiles_result = user_profiles_public::table
        .order(user_profiles_public::created_at.asc())
        .limit(pagination.limit())
        .offset(pagination.offset())
        .load::<PublicProfile>(&mut conn)
        .await;

    match profiles_result {
        Ok(profiles) => (
            StatusCode::OK,
            Json(serde_json::to_value(profiles).unwrap_or_default()),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to fetch profiles: {}", e)
            })),
        ),
    }
}

/// Get a profile by user id. The owner sees the full row; everyone else
/// gets the public projection.
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ViewerQuery>,
) -> impl IntoResponse {
    let mut conn = match state.pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Database connection error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Database error: {}", e)
                })),
            );
        }
    };

    if query.viewer.as_deref() == Some(user_id.as_str()) {
        let profile_result = user_profiles::table
            .filter(user_profiles::user_id.eq(&user_id))
            .first::<UserProfile>(&mut conn)
            .await;

        return match profile_result {
            Ok(profile) => (
                StatusCode::OK,
                Json(serde_json::to_value(profile).unwrap_or_default()),
            ),
            Err(diesel::result::Error::NotFound) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({
                    "error": "Profile not found"
                })),
            ),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to fetch profile: {}", e)
                })),
            ),
        };
    }

    let profile_result = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq(&user_id))
        .first::<PublicProfile>(&mut conn)
        .await;

    match profile_result {
        Ok(profile) => (
            StatusCode::OK,
            Json(serde_json::to_value(profile).unwrap_or_default()),
        ),
        Err(diesel::result::Error::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({
                "error": "Profile not found"
            })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": format!("Failed to fetch profile: {}", e)
            })),
        ),
    }
}

/// Create a profile at signup time.
pub async fn create_profile(
    State(state): State<AppState>,
    Json(body): Json<NewUserProfile>,
) -> Result<impl IntoResponse, DomainError> {
    if body.user_id.trim().is_empty() {
        return Err(DomainError::validation("user_id is required"));
    }
    if body.display_name.trim().is_empty() {
        return Err(DomainError::validation("Display name is required"));
    }

    let mut conn = state.pool.get().await?;

    // Admin status is granted out of band, never at signup.
    let new_profile = NewUserProfile {
        is_admin: false,
        ..body
    };
    let profile: UserProfile = diesel::insert_into(user_profiles::table)
        .values(&new_profile)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(profile))))
}

/// Update the owner's profile.
pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<UpdateUserProfile>,
) -> Result<impl IntoResponse, DomainError> {
    let display_name = match &body.display_name {
        Some(name) if !name.trim().is_empty() => name.clone(),
        Some(_) => return Err(DomainError::validation("Display name cannot be empty")),
        None => return Err(DomainError::validation("Nothing to update")),
    };

    let mut conn = state.pool.get().await?;

    let profile: UserProfile =
        diesel::update(user_profiles::table.filter(user_profiles::user_id.eq(&user_id)))
            .set(user_profiles::display_name.eq(display_name))
            .get_result(&mut conn)
            .await?;

    Ok(Json(ApiResponse::success(profile)))
}
