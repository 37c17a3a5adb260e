// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use tracing::error;

use crate::api::routes::ApiResponse;
use crate::api::AppState;
use crate::config::Config;
use crate::engine::quest::{
    classify_quest, tally_votes, validate_entry_photo, validate_entry_submission, validate_vote,
};
use crate::error::DomainError;
use crate::metrics;
use crate::models::photo::Photo;
use crate::models::quest::{
    EntryDetail, NewQuest, NewQuestEntry, NewQuestVote, Quest, QuestEntry, QuestSummary,
};
use crate::models::profile::UserProfile;
use crate::schema::{photos, quest_entries, quest_votes, quests, user_profiles, user_profiles_public};

#[derive(Debug, Deserialize)]
pub struct CreateQuestBody {
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub participation_award_url: Option<String>,
    pub top10_award_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitEntryBody {
    pub user_id: String,
    pub photo_id: i32,
}

#[derive(Debug, Deserialize)]
pub struct CastVoteBody {
    pub user_id: String,
    pub entry_id: i32,
}

/// List quests with their derived phase and entry counts.
pub async fn get_quests(State(state): State<AppState>) -> impl IntoResponse {
    let mut conn = match state.pool.get().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Database connection error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Database error: {}", e)
                })),
            );
        }
    };

    let quests_result = quests::table
        .order(quests::start_time.desc())
        .load::<Quest>(&mut conn)
        .await;
    let quest_rows = match quests_result {
        Ok(rows) => rows,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to fetch quests: {}", e)
                })),
            )
        }
    };

    let counts_result = quest_entries::table
        .group_by(quest_entries::quest_id)
        .select((quest_entries::quest_id, diesel::dsl::count_star()))
        .load::<(i32, i64)>(&mut conn)
        .await;
    let counts: HashMap<i32, i64> = match counts_result {
        Ok(pairs) => pairs.into_iter().collect(),
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": format!("Failed to count quest entries: {}", e)
                })),
            )
        }
    };

    let now = Utc::now().naive_utc();
    let summaries: Vec<QuestSummary> = quest_rows
        .into_iter()
        .map(|quest| {
            let phase = classify_quest(quest.start_time, quest.end_time, now).as_str();
            let entry_count = counts.get(&quest.id).copied().unwrap_or(0);
            QuestSummary {
                quest,
                phase,
                entry_count,
            }
        })
        .collect();

    (
        StatusCode::OK,
        Json(serde_json::to_value(summaries).unwrap_or_default()),
    )
}

/// Quest detail: entries with vote tallies, the derived phase, and the
/// winner once one has been assigned. Tallies are for display; the winner
/// is injected data, never derived from the counts here.
pub async fn get_quest(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, DomainError> {
    let mut conn = state.pool.get().await?;

    let quest: Quest = quests::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Quest not found"))?;

    let entries: Vec<QuestEntry> = quest_entries::table
        .filter(quest_entries::quest_id.eq(id))
        .order(quest_entries::created_at.asc())
        .load(&mut conn)
        .await?;

    let photo_ids: Vec<i32> = entries.iter().map(|e| e.photo_id).collect();
    let photo_paths: HashMap<i32, (String, Option<String>)> = photos::table
        .filter(photos::id.eq_any(&photo_ids))
        .select((photos::id, photos::storage_path, photos::thumbnail_path))
        .load::<(i32, String, Option<String>)>(&mut conn)
        .await?
        .into_iter()
        .map(|(id, path, thumb)| (id, (path, thumb)))
        .collect();

    let user_ids: Vec<String> = entries
        .iter()
        .map(|e| e.user_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let names: HashMap<String, String> = user_profiles_public::table
        .filter(user_profiles_public::user_id.eq_any(&user_ids))
        .select((user_profiles_public::user_id, user_profiles_public::display_name))
        .load::<(String, String)>(&mut conn)
        .await?
        .into_iter()
        .collect();

    let votes: Vec<(String, i32)> = quest_votes::table
        .filter(quest_votes::quest_id.eq(id))
        .select((quest_votes::voter_user_id, quest_votes::entry_id))
        .load(&mut conn)
        .await?;
    let tally = tally_votes(votes);

    let config = Config::get();
    let ttl = config.storage.signed_url_ttl_secs;
    let mut details = Vec::with_capacity(entries.len());
    for entry in &entries {
        let (photo_url, thumbnail_url) = match photo_paths.get(&entry.photo_id) {
            Some((path, thumb)) => {
                let url = state
                    .store
                    .create_signed_url(&config.storage.photo_bucket, path, ttl)
                    .await?;
                let thumb_url = match thumb {
                    Some(thumb_path) => Some(
                        state
                            .store
                            .create_signed_url(&config.storage.photo_bucket, thumb_path, ttl)
                            .await?,
                    ),
                    None => None,
                };
                (url, thumb_url)
            }
            None => continue,
        };
        details.push(EntryDetail {
            id: entry.id,
            user_id: entry.user_id.clone(),
            display_name: names.get(&entry.user_id).cloned(),
            photo_id: entry.photo_id,
            photo_url,
            thumbnail_url,
            vote_count: tally.get(&entry.id).copied().unwrap_or(0),
            created_at: entry.created_at,
        });
    }
    details.sort_by(|a, b| {
        b.vote_count
            .cmp(&a.vote_count)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    let now = Utc::now().naive_utc();
    Ok(Json(json!({
        "quest": quest,
        "phase": classify_quest(quest.start_time, quest.end_time, now).as_str(),
        "entries": details,
        "winner_entry_id": quest.winner_entry_id,
    })))
}

/// Create a quest. Admin only.
pub async fn create_quest(
    State(state): State<AppState>,
    Json(body): Json<CreateQuestBody>,
) -> Result<impl IntoResponse, DomainError> {
    if body.name.trim().is_empty() {
        return Err(DomainError::validation("Quest name is required"));
    }
    if body.end_time <= body.start_time {
        return Err(DomainError::validation(
            "Quest end time must be after the start time",
        ));
    }

    let mut conn = state.pool.get().await?;

    let acting: UserProfile = user_profiles::table
        .filter(user_profiles::user_id.eq(&body.user_id))
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("No such user"))?;
    if !acting.is_admin {
        return Err(DomainError::validation("Only admins can create quests"));
    }

    let new_quest = NewQuest {
        name: body.name,
        description: body.description,
        start_time: body.start_time,
        end_time: body.end_time,
        participation_award_url: body.participation_award_url,
        top10_award_url: body.top10_award_url,
    };
    let quest: Quest = diesel::insert_into(quests::table)
        .values(&new_quest)
        .get_result(&mut conn)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(quest))))
}

/// Submit the acting user's single entry for an active quest. The
/// duplicate check runs before the insert; the unique key on
/// (quest_id, user_id) remains the backstop.
pub async fn submit_entry(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<SubmitEntryBody>,
) -> Result<impl IntoResponse, DomainError> {
    let mut conn = state.pool.get().await?;

    let quest: Quest = quests::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Quest not found"))?;

    let photo: Photo = photos::table
        .find(body.photo_id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Photo not found"))?;
    validate_entry_photo(&photo.owner_user_id, &body.user_id)?;

    let existing: i64 = quest_entries::table
        .filter(quest_entries::quest_id.eq(id))
        .filter(quest_entries::user_id.eq(&body.user_id))
        .count()
        .get_result(&mut conn)
        .await?;

    let now = Utc::now().naive_utc();
    let phase = classify_quest(quest.start_time, quest.end_time, now);
    validate_entry_submission(phase, existing > 0)?;

    let new_entry = NewQuestEntry {
        quest_id: id,
        user_id: body.user_id,
        photo_id: body.photo_id,
    };
    let entry: QuestEntry = diesel::insert_into(quest_entries::table)
        .values(&new_entry)
        .get_result(&mut conn)
        .await?;

    metrics::QUEST_ENTRIES_SUBMITTED.inc();
    Ok((StatusCode::CREATED, Json(ApiResponse::success(entry))))
}

/// Cast or move the acting user's vote. Upsert on (quest, voter): voting
/// again replaces the earlier vote instead of adding one.
pub async fn cast_vote(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<CastVoteBody>,
) -> Result<Json<ApiResponse<serde_json::Value>>, DomainError> {
    let mut conn = state.pool.get().await?;

    let quest: Quest = quests::table
        .find(id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Quest not found"))?;

    let now = Utc::now().naive_utc();
    validate_vote(classify_quest(quest.start_time, quest.end_time, now))?;

    let entry: QuestEntry = quest_entries::table
        .find(body.entry_id)
        .first(&mut conn)
        .await
        .optional()?
        .ok_or_else(|| DomainError::not_found("Entry not found"))?;
    if entry.quest_id != id {
        return Err(DomainError::not_found("Entry not found"));
    }

    let vote = NewQuestVote {
        quest_id: id,
        voter_user_id: body.user_id.clone(),
        entry_id: body.entry_id,
    };
    diesel::insert_into(quest_votes::table)
        .values(&vote)
        .on_conflict((quest_votes::quest_id, quest_votes::voter_user_id))
        .do_update()
        .set(quest_votes::entry_id.eq(body.entry_id))
        .execute(&mut conn)
        .await?;

    metrics::QUEST_VOTES_CAST.inc();
    Ok(Json(ApiResponse::success(json!({
        "quest_id": id,
        "voter_user_id": body.user_id,
        "entry_id": body.entry_id,
    }))))
}
