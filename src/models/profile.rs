// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::{user_profiles, user_profiles_public};

#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = user_profiles)]
pub struct UserProfile {
    pub id: i32,
    pub user_id: String,
    pub display_name: String,
    pub is_admin: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Public-safe projection served to other users, backed by a database view.
#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = user_profiles_public)]
pub struct PublicProfile {
    pub id: i32,
    pub user_id: String,
    pub display_name: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = user_profiles)]
pub struct NewUserProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub is_admin: bool,
}

#[derive(Debug, AsChangeset, Deserialize)]
#[diesel(table_name = user_profiles)]
pub struct UpdateUserProfile {
    pub display_name: Option<String>,
}
