// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::friendships;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_ACCEPTED: &str = "accepted";

/// Model for a friendship between two users. Directed while pending
/// (requester asked addressee), undirected once accepted.
#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = friendships)]
pub struct Friendship {
    pub id: i32,
    pub requester_user_id: String,
    pub addressee_user_id: String,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl Friendship {
    /// The other participant, seen from `user_id`'s side.
    pub fn other_user<'a>(&'a self, user_id: &str) -> &'a str {
        if self.requester_user_id == user_id {
            &self.addressee_user_id
        } else {
            &self.requester_user_id
        }
    }
}

/// DTO for creating a new friendship request
#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = friendships)]
pub struct NewFriendship {
    pub requester_user_id: String,
    pub addressee_user_id: String,
    pub status: String,
}

/// DTO for listing a user's friends with profile details
#[derive(Debug, Serialize)]
pub struct FriendDetail {
    pub user_id: String,
    pub display_name: String,
    pub status: String,
    pub since: NaiveDateTime,
}
