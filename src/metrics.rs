// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

pub static PHOTOS_CREATED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "birddex_photos_created_total",
        "Number of photos registered through the API"
    )
    .expect("metric can be registered")
});

pub static COMMENTS_POSTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "birddex_comments_posted_total",
        "Number of comments posted"
    )
    .expect("metric can be registered")
});

pub static QUEST_ENTRIES_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "birddex_quest_entries_submitted_total",
        "Number of quest entries accepted"
    )
    .expect("metric can be registered")
});

pub static QUEST_VOTES_CAST: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "birddex_quest_votes_cast_total",
        "Number of quest votes written (including overwrites)"
    )
    .expect("metric can be registered")
});
