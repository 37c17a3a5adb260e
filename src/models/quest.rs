// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::{quest_entries, quest_votes, quests};

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = quests)]
pub struct Quest {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub participation_award_url: Option<String>,
    pub top10_award_url: Option<String>,
    pub winner_entry_id: Option<i32>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = quests)]
pub struct NewQuest {
    pub name: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub participation_award_url: Option<String>,
    pub top10_award_url: Option<String>,
}

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = quest_entries)]
pub struct QuestEntry {
    pub id: i32,
    pub quest_id: i32,
    pub user_id: String,
    pub photo_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quest_entries)]
pub struct NewQuestEntry {
    pub quest_id: i32,
    pub user_id: String,
    pub photo_id: i32,
}

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = quest_votes)]
pub struct QuestVote {
    pub quest_id: i32,
    pub voter_user_id: String,
    pub entry_id: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = quest_votes)]
pub struct NewQuestVote {
    pub quest_id: i32,
    pub voter_user_id: String,
    pub entry_id: i32,
}

/// Quest with its render-time phase. The phase is derived from the clock on
/// every request, never stored.
#[derive(Debug, Serialize)]
pub struct QuestSummary {
    #[serde(flatten)]
    pub quest: Quest,
    pub phase: &'static str,
    pub entry_count: i64,
}

/// Entry joined with its photo and vote tally for the quest detail page.
#[derive(Debug, Serialize)]
pub struct EntryDetail {
    pub id: i32,
    pub user_id: String,
    pub display_name: Option<String>,
    pub photo_id: i32,
    pub photo_url: String,
    pub thumbnail_url: Option<String>,
    pub vote_count: i64,
    pub created_at: NaiveDateTime,
}
