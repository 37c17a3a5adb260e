// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    Json,
};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use std::collections::{BTreeMap, HashMap};

use crate::api::routes::ApiResponse;
use crate::api::AppState;
use crate::db::DbConnection;
use crate::engine::collection::must_clear_top;
use crate::error::{DomainError, HIDDEN_TOP_FRIENDLY};
use crate::models::photo::{Photo, PhotoView};
use crate::models::top_species::NewTopSpeciesEntry;
use crate::schema::{photos, top_species, user_profiles_public};

use super::friendships::ActingUser;
use super::photos::photo_view;

#[derive(Debug, Deserialize)]
pub struct SetTopPhotoBody {
    pub user_id: String,
    pub photo_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReassignSpeciesBody {
    pub user_id: String,
    pub species_id: String,
}

/// Hide a photo from its species view. Two ordered steps: clear the top
/// mapping when it points at this photo, then set the flag. The steps are
/// separate statements; a failure in between leaves the species without a
/// top photo, which downstream views tolerate. The reverse order would be
/// rejected by the database guard.
pub(super) async fn hide_photo_for_species(
    conn: &mut DbConnection,
    photo: &Photo,
) -> Result<(), DomainError> {
    let current_top: Option<i32> = top_species::table
        .filter(top_species::user_id.eq(&photo.owner_user_id))
        .filter(top_species::species_id.eq(&photo.species_id))
        .select(top_species::photo_id)
        .first(&mut *conn)
        .await
        .optional()?;

    if must_clear_top(current_top, photo.id) {
        diesel::delete(
            top_species::table
                .filter(top_species::user_id.eq(&photo.owner_user_id))
                .filter(top_species::species_id.eq(&photo.species_id)),
        )
        .execute(&mut *conn)
        .await?;
    }

    diesel::update(photos::table.find(photo.id))
        .set(photos::hidden_from_species_view.eq(true))
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// The collection grid: one tile per species with the designated top photo
/// (or the newest photo when none is designated) and a count.
pub async fn get_dex(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let mut conn = state.pool.get().await?;

    let display_name: String = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq(&user_id))
        .select(user_profiles_public::display_name)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Profile not found"))?;

    let photo_rows: Vec<Photo> = photos::table
        .filter(photos::owner_user_id.eq(&user_id))
        .filter(photos::hidden_from_species_view.eq(false))
        .order(photos::created_at.desc())
        .load(&mut conn)
        .await?;

    let tops: HashMap<String, i32> = top_species::table
        .filter(top_species::user_id.eq(&user_id))
        .select((top_species::species_id, top_species::photo_id))
        .load::<(String, i32)>(&mut conn)
        .await?
        .into_iter()
        .collect();

    let mut by_species: BTreeMap<&str, Vec<&Photo>> = BTreeMap::new();
    for photo in &photo_rows {
        by_species.entry(photo.species_id.as_str()).or_default().push(photo);
    }

    let mut species_tiles = Vec::with_capacity(by_species.len());
    for (species_id, group) in &by_species {
        // Photos are loaded newest-first, so the head is the fallback tile.
        let top_photo = tops
            .get(*species_id)
            .and_then(|photo_id| group.iter().find(|p| p.id == *photo_id))
            .or_else(|| group.as_slice().first())
            .copied();

        if let Some(photo) = top_photo {
            let is_top = tops.get(*species_id) == Some(&photo.id);
            let view = photo_view(&state, photo, Some(display_name.clone()), is_top).await?;
            species_tiles.push(json!({
                "species_id": species_id,
                "photo_count": group.len(),
                "top_photo": view,
            }));
        }
    }

    Ok(Json(json!({
        "user_id": user_id,
        "display_name": display_name,
        "species": species_tiles,
    })))
}

/// All of a user's non-hidden photos for one species.
pub async fn get_species_photos(
    State(state): State<AppState>,
    Path((user_id, species_id)): Path<(String, String)>,
) -> Result<Json<Vec<PhotoView>>, DomainError> {
    let mut conn = state.pool.get().await?;

    let photo_rows: Vec<Photo> = photos::table
        .filter(photos::owner_user_id.eq(&user_id))
        .filter(photos::species_id.eq(&species_id))
        .filter(photos::hidden_from_species_view.eq(false))
        .order(photos::created_at.desc())
        .load(&mut conn)
        .await?;

    let top_photo_id: Option<i32> = top_species::table
        .filter(top_species::user_id.eq(&user_id))
        .filter(top_species::species_id.eq(&species_id))
        .select(top_species::photo_id)
        .first(&mut conn)
        .await
        .optional()?;

    let views = futures::future::try_join_all(
        photo_rows
            .iter()
            .map(|photo| photo_view(&state, photo, None, top_photo_id == Some(photo.id))),
    )
    .await?;

    Ok(Json(views))
}

/// Designate the top photo for a (user, species) pair. Last write wins; no
/// other photo's flags are touched.
pub async fn set_top_photo(
    State(state): State<AppState>,
    Path((user_id, species_id)): Path<(String, String)>,
    Json(body): Json<SetTopPhotoBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, DomainError> {
    if body.user_id != user_id {
        return Err(DomainError::validation("You can only edit your own dex"));
    }

    let mut conn = state.pool.get().await?;

    let photo: Photo = photos::table
        .find(body.photo_id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;

    if photo.owner_user_id != user_id {
        return Err(DomainError::validation("Photo belongs to another user"));
    }
    if photo.species_id != species_id {
        return Err(DomainError::validation("Photo is not tagged with this species"));
    }
    // The database guard would refuse this too; catching it here keeps the
    // friendly message and avoids a wasted round trip.
    if photo.hidden_from_species_view {
        return Err(DomainError::validation(HIDDEN_TOP_FRIENDLY));
    }

    let mapping = NewTopSpeciesEntry {
        user_id: user_id.clone(),
        species_id: species_id.clone(),
        photo_id: body.photo_id,
    };
    diesel::insert_into(top_species::table)
        .values(&mapping)
        .on_conflict((top_species::user_id, top_species::species_id))
        .do_update()
        .set(top_species::photo_id.eq(body.photo_id))
        .execute(&mut conn)
        .await?;

    Ok(Json(ApiResponse::success(json!({
        "user_id": user_id,
        "species_id": species_id,
        "photo_id": body.photo_id,
    }))))
}

/// Remove a photo from the species view.
pub async fn hide_from_species_view(
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
        return Err(DomainError::validation("Only the owner can edit a photo"));
    }

    hide_photo_for_species(&mut conn, &photo).await?;

    Ok(Json(ApiResponse::success(json!({
        "photo_id": id,
        "hidden_from_species_view": true,
    }))))
}

/// Re-tag a photo to a different species. When the photo was the old
/// species' top photo, that mapping is cleared as part of the operation so
/// it cannot dangle.
pub async fn reassign_species(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<ReassignSpeciesBody>,
) -> Result<Json<ApiResponse<Photo>>, DomainError> {
    if body.species_id.trim().is_empty() {
        return Err(DomainError::validation("species_id is required"));
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
    if photo.species_id == body.species_id {
        return Ok(Json(ApiResponse::success(photo)));
    }

    let current_top: Option<i32> = top_species::table
        .filter(top_species::user_id.eq(&photo.owner_user_id))
        .filter(top_species::species_id.eq(&photo.species_id))
        .select(top_species::photo_id)
        .first(&mut conn)
        .await
        .optional()?;

    if must_clear_top(current_top, photo.id) {
        diesel::delete(
            top_species::table
                .filter(top_species::user_id.eq(&photo.owner_user_id))
                .filter(top_species::species_id.eq(&photo.species_id)),
        )
        .execute(&mut conn)
        .await?;
    }

    let updated: Photo = diesel::update(photos::table.find(id))
        .set(photos::species_id.eq(&body.species_id))
        .get_result(&mut conn)
        .await?;

    Ok(Json(ApiResponse::success(updated)))
}
