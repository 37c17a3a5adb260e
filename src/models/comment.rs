// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::comments;

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = comments)]
pub struct Comment {
    pub id: i32,
    pub photo_id: i32,
    pub user_id: String,
    pub content: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = comments)]
pub struct NewComment {
    pub photo_id: i32,
    pub user_id: String,
    pub content: String,
}

/// Comment joined with the author's display name for photo detail pages.
#[derive(Debug, Serialize)]
pub struct CommentDetail {
    pub id: i32,
    pub user_id: String,
    pub display_name: Option<String>,
    pub content: String,
    pub created_at: NaiveDateTime,
}
