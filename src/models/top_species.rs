// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use crate::schema::top_species;

/// The designated top photo for one (user, species) pair. At most one row
/// per pair; "set as top" overwrites in place.
#[derive(Debug, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = top_species)]
pub struct TopSpeciesEntry {
    pub user_id: String,
    pub species_id: String,
    pub photo_id: i32,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = top_species)]
pub struct NewTopSpeciesEntry {
    pub user_id: String,
    pub species_id: String,
    pub photo_id: i32,
}
