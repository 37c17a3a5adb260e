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
use std::collections::HashMap;
use tracing::{debug, error};

use crate::api::routes::ApiResponse;
use crate::api::AppState;
use crate::error::DomainError;
use crate::models::friendship::{
    FriendDetail, Friendship, NewFriendship, STATUS_ACCEPTED, STATUS_PENDING,
};
use crate::schema::{friendships, user_profiles, user_profiles_public};

#[derive(Debug, Deserialize)]
pub struct FriendsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FriendshipRequest {
    pub requester_user_id: String,
    pub addressee_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ActingUser {
    pub user_id: String,
}

/// List a user's friends (accepted by default, `?status=pending` for open
/// requests). The friend list is the union over both friendship roles.
pub async fn get_friends(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<FriendsQuery>,
) -> impl IntoResponse {
    let status = query.status.unwrap_or_else(|| STATUS_ACCEPTED.to_string());
    debug!("Listing {} friendships for {}", status, user_id);

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

    let rows_result = friendships::table
        .filter(
            friendships::requester_user_id
                .eq(&user_id)
                .or(friendships::addressee_user_id.eq(&user_id)),
        )
        .filter(friendships::status.eq(&status))
        .order(friendships::created_at.desc())
        .load::<Friendship>(&mut conn)
        .await;

    let rows = match rows_result {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to fetch friendships: {}", e)
                })),
            )
        }
    };

    let other_ids: Vec<String> = rows
        .iter()
        .map(|f| f.other_user(&user_id).to_string())
        .collect();

    let names_result = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq_any(&other_ids))
        .select((user_profiles_public::user_id, user_profiles_public::display_name))
        .load::<(String, String)>(&mut conn)
        .await;

    let names: HashMap<String, String> = match names_result {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": format!("Failed to fetch profiles: {}", e)
                })),
            )
        }
    };

    let friends: Vec<FriendDetail> = rows
        .iter()
        .map(|f| {
            let other = f.other_user(&user_id);
            FriendDetail {
                user_id: other.to_string(),
                display_name: names
                    .get(other)
                    .cloned()
                    .unwrap_or_else(|| other.to_string()),
                status: f.status.clone(),
                since: f.created_at,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::to_value(friends).unwrap_or_default()),
    )
}

/// Create a pending friendship request.
pub async fn request_friendship(
    State(state): State<AppState>,
    Json(body): Json<FriendshipRequest>,
) -> Result<impl IntoResponse, DomainError> {
    if body.requester_user_id == body.addressee_user_id {
        return Err(DomainError::validation("You cannot friend yourself"));
    }

    let mut conn = state.pool.get().await?;

    let addressee_count: i64 = user_profiles::table
        .filter(user_profiles::user_id.eq(&body.addressee_user_id))
        .count()
        .get_result(&mut conn)
        .await?;
    if addressee_count == 0 {
        return Err(DomainError::not_found("No such user"));
    }

    // One friendship per unordered pair, regardless of who asked first.
    let existing: i64 = friendships::table
        .filter(
            friendships::requester_user_id
                .eq(&body.requester_user_id)
                .and(friendships::addressee_user_id.eq(&body.addressee_user_id))
                .or(friendships::requester_user_id
                    .eq(&body.addressee_user_id)
                    .and(friendships::addressee_user_id.eq(&body.requester_user_id))),
        )
        .count()
        .get_result(&mut conn)
        .await?;
    if existing > 0 {
        return Err(DomainError::DuplicateAction(
            "A friendship between these users already exists".to_string(),
        ));
    }

    let new_friendship = NewFriendship {
        requester_user_id: body.requester_user_id,
        addressee_user_id: body.addressee_user_id,
        status: STATUS_PENDING.to_string(),
    };

    let friendship: Friendship = diesel::insert_into(friendships::table)
        .values(&new_friendship)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(friendship))))
}

/// Accept a pending request. Only the addressee may accept; accepting an
/// already-accepted friendship is a no-op.
pub async fn accept_friendship(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ActingUser>,
) -> Result<impl IntoResponse, DomainError> {
    let mut conn = state.pool.get().await?;

    let friendship: Friendship = friendships::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Friendship not found"))?;

    if friendship.addressee_user_id != body.user_id {
        return Err(DomainError::validation(
            "Only the addressee can accept a friend request",
        ));
    }

    if friendship.status == STATUS_ACCEPTED {
        return Ok(Json(ApiResponse::success(friendship)));
    }

    let updated: Friendship = diesel::update(friendships::table.find(id))
        .set(friendships::status.eq(STATUS_ACCEPTED))
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
