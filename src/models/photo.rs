// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::photos;

/// Who may see a photo outside the owner's own pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoPrivacy {
    Public,
    Friends,
    Private,
}

impl PhotoPrivacy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoPrivacy::Public => "public",
            PhotoPrivacy::Friends => "friends",
            PhotoPrivacy::Private => "private",
        }
    }

    /// Parse the stored text form. The database CHECK constraint allows the
    /// same three values, so this only rejects input that never reached it.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(PhotoPrivacy::Public),
            "friends" => Some(PhotoPrivacy::Friends),
            "private" => Some(PhotoPrivacy::Private),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = photos)]
pub struct Photo {
    pub id: i32,
    pub owner_user_id: String,
    pub species_id: String,
    pub storage_path: String,
    pub thumbnail_path: Option<String>,
    pub privacy: String,
    pub hidden_from_feed: bool,
    pub hidden_from_species_view: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable, Deserialize)]
#[diesel(table_name = photos)]
pub struct NewPhoto {
    pub owner_user_id: String,
    pub species_id: String,
    pub storage_path: String,
    pub thumbnail_path: Option<String>,
    pub privacy: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
}

/// Display shape for feed, dex, and detail pages. URLs are regenerated from
/// the object store on every render; `is_top` is derived from the
/// `top_species` mapping rather than stored on the row.
#[derive(Debug, Serialize)]
pub struct PhotoView {
    pub id: i32,
    pub owner_user_id: String,
    pub owner_display_name: Option<String>,
    pub species_id: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub privacy: String,
    pub is_top: bool,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}
