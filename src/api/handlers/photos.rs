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
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::api::routes::{ApiResponse, PaginationParams};
use crate::api::AppState;
use crate::config::Config;
use crate::db::DbConnection;
use crate::error::{friendly_db_message, DomainError};
use crate::external::geocoding::describe_location;
use crate::metrics;
use crate::models::comment::{Comment, CommentDetail, NewComment};
use crate::models::friendship::STATUS_ACCEPTED;
use crate::models::photo::{NewPhoto, Photo, PhotoPrivacy, PhotoView};
use crate::schema::{comments, friendships, photos, top_species, user_profiles, user_profiles_public};

use super::friendships::ActingUser;
use super::profiles::ViewerQuery;

diesel::sql_function! {
    /// Server-side cascade-or-hide routine for photo deletion.
    fn delete_or_hide_photo(p_photo_id: diesel::sql_types::Integer) -> diesel::sql_types::Jsonb;
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub viewer: String,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentBody {
    pub user_id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SetPrivacyBody {
    pub user_id: String,
    pub privacy: String,
}

#[derive(Debug, Deserialize)]
pub struct SetFeedVisibilityBody {
    pub user_id: String,
    pub hidden_from_feed: bool,
}

/// Build the display shape for a photo. Signed URLs are generated fresh
/// here on every call; they are never persisted.
pub(super) async fn photo_view(
    state: &AppState,
    photo: &Photo,
    owner_display_name: Option<String>,
    is_top: bool,
) -> Result<PhotoView, DomainError> {
    let config = Config::get();
    let ttl = config.storage.signed_url_ttl_secs;

    let url = state
        .store
        .create_signed_url(&config.storage.photo_bucket, &photo.storage_path, ttl)
        .await?;
    let thumbnail_url = match &photo.thumbnail_path {
        Some(path) => Some(
            state
                .store
                .create_signed_url(&config.storage.photo_bucket, path, ttl)
                .await?,
        ),
        None => None,
    };

    Ok(PhotoView {
        id: photo.id,
        owner_user_id: photo.owner_user_id.clone(),
        owner_display_name,
        species_id: photo.species_id.clone(),
        url,
        thumbnail_url,
        privacy: photo.privacy.clone(),
        is_top,
        lat: photo.lat,
        lng: photo.lng,
        description: photo.description.clone(),
        created_at: photo.created_at,
    })
}

/// Whether an accepted friendship exists between two users, in either role.
pub(super) async fn are_friends(
    conn: &mut DbConnection,
    a: &str,
    b: &str,
) -> Result<bool, DomainError> {
    let count: i64 = friendships::table
        .filter(friendships::status.eq(STATUS_ACCEPTED))
        .filter(
            friendships::requester_user_id
                .eq(a)
                .and(friendships::addressee_user_id.eq(b))
                .or(friendships::requester_user_id
                    .eq(b)
                    .and(friendships::addressee_user_id.eq(a))),
        )
        .count()
        .get_result(conn)
        .await?;
    Ok(count > 0)
}

/// Activity feed: the viewer's own photos plus friends' photos, honoring
/// privacy and the feed-visibility flag.
pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let pagination = PaginationParams {
        limit: query.limit,
        offset: query.offset,
    };
    let mut conn = state.pool.get().await?;

    let friend_rows = friendships::table
        .filter(friendships::status.eq(STATUS_ACCEPTED))
        .filter(
            friendships::requester_user_id
                .eq(&query.viewer)
                .or(friendships::addressee_user_id.eq(&query.viewer)),
        )
        .load::<crate::models::friendship::Friendship>(&mut conn)
        .await?;
    let friend_ids: Vec<String> = friend_rows
        .iter()
        .map(|f| f.other_user(&query.viewer).to_string())
        .collect();

    let photo_rows: Vec<Photo> = photos::table
        .filter(photos::hidden_from_feed.eq(false))
        .filter(
            photos::owner_user_id.eq(&query.viewer).or(photos::owner_user_id
                .eq_any(&friend_ids)
                .and(photos::privacy.ne(PhotoPrivacy::Private.as_str()))),
        )
        .order(photos::created_at.desc())
        .limit(pagination.limit())
        .offset(pagination.offset())
        .load(&mut conn)
        .await?;

    let owner_ids: Vec<String> = photo_rows
        .iter()
        .map(|p| p.owner_user_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<String, String> = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq_any(&owner_ids))
        .select((user_profiles_public::user_id, user_profiles_public::display_name))
        .load::<(String, String)>(&mut conn)
        .await?
        .into_iter()
        .collect();

    let photo_ids: Vec<i32> = photo_rows.iter().map(|p| p.id).collect();
    let top_ids: HashSet<i32> = top_species::table
        .filter(top_species::photo_id.eq_any(&photo_ids))
        .select(top_species::photo_id)
        .load::<i32>(&mut conn)
        .await?
        .into_iter()
        .collect();

    let views = futures::future::try_join_all(photo_rows.iter().map(|photo| {
        photo_view(
            &state,
            photo,
            names.get(&photo.owner_user_id).cloned(),
            top_ids.contains(&photo.id),
        )
    }))
    .await?;

    Ok(Json(json!({
        "photos": views,
        "limit": pagination.limit(),
        "offset": pagination.offset(),
    })))
}

/// Register an uploaded photo.
pub async fn create_photo(
    State(state): State<AppState>,
    Json(body): Json<NewPhoto>,
) -> Result<impl IntoResponse, DomainError> {
    if body.species_id.trim().is_empty() {
        return Err(DomainError::validation("species_id is required"));
    }
    if body.storage_path.trim().is_empty() {
        return Err(DomainError::validation("storage_path is required"));
    }
    if PhotoPrivacy::parse(&body.privacy).is_none() {
        return Err(DomainError::validation(
            "Privacy must be one of public, friends, private",
        ));
    }

    let mut conn = state.pool.get().await?;

    let owner_count: i64 = user_profiles::table
        .filter(user_profiles::user_id.eq(&body.owner_user_id))
        .count()
        .get_result(&mut conn)
        .await?;
    if owner_count == 0 {
        return Err(DomainError::not_found("No such user"));
    }

    let photo: Photo = diesel::insert_into(photos::table)
        .values(&body)
        .get_result(&mut conn)
        .await?;

    metrics::PHOTOS_CREATED.inc();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(photo))))
}

/// Photo detail: the photo with fresh display URLs, its comments, and a
/// best-effort location string.
pub async fn get_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<ViewerQuery>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let mut conn = state.pool.get().await?;

    let photo: Photo = photos::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;

    let is_owner = query.viewer.as_deref() == Some(photo.owner_user_id.as_str());
    if !is_owner {
        // Absent and forbidden are indistinguishable on purpose.
        match PhotoPrivacy::parse(&photo.privacy) {
            Some(PhotoPrivacy::Public) => {}
            Some(PhotoPrivacy::Friends) => {
                let viewer = query
                    .viewer
                    .as_deref()
                    .ok_or_else(|| DomainError::not_found("Photo not found"))?;
                if !are_friends(&mut conn, &photo.owner_user_id, viewer).await? {
                    return Err(DomainError::not_found("Photo not found"));
                }
            }
            _ => return Err(DomainError::not_found("Photo not found")),
        }
    }

    let comment_rows: Vec<Comment> = comments::table
        .filter(comments::photo_id.eq(id))
        .order(comments::created_at.asc())
        .load(&mut conn)
        .await?;

    let author_ids: Vec<String> = comment_rows
        .iter()
        .map(|c| c.user_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<String, String> = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq_any(&author_ids))
        .select((user_profiles_public::user_id, user_profiles_public::display_name))
        .load::<(String, String)>(&mut conn)
        .await?
        .into_iter()
        .collect();

    let comment_details: Vec<CommentDetail> = comment_rows
        .iter()
        .map(|c| CommentDetail {
            id: c.id,
            user_id: c.user_id.clone(),
            display_name: names.get(&c.user_id).cloned(),
            content: c.content.clone(),
            created_at: c.created_at,
        })
        .collect();

    let top_count: i64 = top_species::table
        .filter(top_species::photo_id.eq(id))
        .count()
        .get_result(&mut conn)
        .await?;

    let owner_name: Option<String> = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq(&photo.owner_user_id))
        .select(user_profiles_public::display_name)
        .first(&mut conn)
        .await
        .optional()?;

    let location = describe_location(state.geocoder.as_ref(), photo.lat, photo.lng).await;
    let view = photo_view(&state, &photo, owner_name, top_count > 0).await?;

    Ok(Json(json!({
        "photo": view,
        "comments": comment_details,
        "location": location,
    })))
}

/// Delete a photo, or hide it when quest entries reference it. The routine
/// reports refusals inside the returned payload even when the call itself
/// succeeds, so both are checked.
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ActingUser>,
) -> Result<Json<ApiResponse<serde_json::Value>>, DomainError> {
    let mut conn = state.pool.get().await?;

    let photo: Photo = photos::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;

    if photo.owner_user_id != body.user_id {
        return Err(DomainError::validation("Only the owner can delete a photo"));
    }

    let payload: serde_json::Value = diesel::select(delete_or_hide_photo(id))
        .get_result(&mut conn)
        .await?;

    if let Some(message) = payload.get("message").and_then(|m| m.as_str()) {
        if message == "Photo not found" {
            return Err(DomainError::not_found(message));
        }
        return Err(DomainError::Persistence(friendly_db_message(message)));
    }

    Ok(Json(ApiResponse::success(payload)))
}

/// List a photo's comments.
pub async fn get_comments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<Vec<CommentDetail>>, DomainError> {
    let mut conn = state.pool.get().await?;

    let comment_rows: Vec<Comment> = comments::table
        .filter(comments::photo_id.eq(id))
        .order(comments::created_at.asc())
        .limit(pagination.limit())
        .offset(pagination.offset())
        .load(&mut conn)
        .await?;

    let author_ids: Vec<String> = comment_rows
        .iter()
        .map(|c| c.user_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<String, String> = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq_any(&author_ids))
        .select((user_profiles_public::user_id, user_profiles_public::display_name))
        .load::<(String, String)>(&mut conn)
        .await?
        .into_iter()
        .collect();

    Ok(Json(
        comment_rows
            .iter()
            .map(|c| CommentDetail {
                id: c.id,
                user_id: c.user_id.clone(),
                display_name: names.get(&c.user_id).cloned(),
                content: c.content.clone(),
                created_at: c.created_at,
            })
            .collect(),
    ))
}

/// Post a comment on a photo.
pub async fn create_comment(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CreateCommentBody>,
) -> Result<impl IntoResponse, DomainError> {
    if body.content.trim().is_empty() {
        return Err(DomainError::validation("Comment cannot be empty"));
    }

    let mut conn = state.pool.get().await?;

    let photo_count: i64 = photos::table
        .filter(photos::id.eq(id))
        .count()
        .get_result(&mut conn)
        .await?;
    if photo_count == 0 {
        return Err(DomainError::not_found("Photo not found"));
    }

    let new_comment = NewComment {
        photo_id: id,
        user_id: body.user_id,
        content: body.content,
    };
    let comment: Comment = diesel::insert_into(comments::table)
        .values(&new_comment)
        .get_result(&mut conn)
        .await?;

    metrics::COMMENTS_POSTED.inc();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(comment))))
}

/// Change a photo's privacy setting.
pub async fn set_privacy(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<SetPrivacyBody>,
) -> Result<Json<ApiResponse<Photo>>, DomainError> {
    if PhotoPrivacy::parse(&body.privacy).is_none() {
        return Err(DomainError::validation(
            "Privacy must be one of public, friends, private",
        ));
    }

    let mut conn = state.pool.get().await?;

    let photo: Photo = photos::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;
    if photo.owner_user_id != body.user_id {
        return Err(DomainError::validation("Only the owner can edit a photo"));
    }

    let updated: Photo = diesel::update(photos::table.find(id))
        .set(photos::privacy.eq(&body.privacy))
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}

/// Show or hide a photo on the activity feed (and the leaderboard, which
/// counts only feed-visible photos).
pub async fn set_feed_visibility(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<SetFeedVisibilityBody>,
) -> Result<Json<ApiResponse<Photo>>, DomainError> {
    let mut conn = state.pool.get().await?;

    let photo: Photo = photos::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;
    if photo.owner_user_id != body.user_id {
        return Err(DomainError::validation("Only the owner can edit a photo"));
    }

    let updated: Photo = diesel::update(photos::table.find(id))
        .set(photos::hidden_from_feed.eq(body.hidden_from_feed))
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
