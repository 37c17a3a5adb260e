use serde::Serialize;

/// One leaderboard row. Fully derived: recomputed from profiles and photos
/// on every view, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: String,
    pub unique_species_count: usize,
    pub total_photos_count: usize,
    pub rank: usize,
}
