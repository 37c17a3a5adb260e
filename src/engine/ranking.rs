// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use std::collections::{HashMap, HashSet};

use crate::models::leaderboard::LeaderboardEntry;

/// Profile fields the ranking needs.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub user_id: String,
    pub display_name: String,
}

/// Photo fields the ranking needs.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    pub owner_user_id: String,
    pub species_id: String,
    pub hidden_from_feed: bool,
}

/// Compute the leaderboard from a snapshot of profiles and photos.
///
/// Ordering policy: unique species count descending, then total photo count
/// descending; remaining ties keep the profile input order (the sort is
/// stable). Ranks are dense and 1-based with no tie-sharing. Photos hidden
/// from the feed are excluded, and photos whose owner has no profile row
/// are skipped.
pub fn compute_leaderboard(
    profiles: &[ProfileRecord],
    photos: &[PhotoRecord],
) -> Vec<LeaderboardEntry> {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(profiles.len());
    for (i, profile) in profiles.iter().enumerate() {
        index.insert(profile.user_id.as_str(), i);
    }

    let mut species: Vec<HashSet<&str>> = vec![HashSet::new(); profiles.len()];
    let mut totals: Vec<usize> = vec![0; profiles.len()];

    for photo in photos {
        if photo.hidden_from_feed {
            continue;
        }
        let Some(&i) = index.get(photo.owner_user_id.as_str()) else {
            continue;
        };
        species[i].insert(photo.species_id.as_str());
        totals[i] += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = profiles
        .iter()
        .enumerate()
        .map(|(i, profile)| LeaderboardEntry {
            user_id: profile.user_id.clone(),
            display_name: profile.display_name.clone(),
            unique_species_count: species[i].len(),
            total_photos_count: totals[i],
            rank: 0,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.unique_species_count
            .cmp(&a.unique_species_count)
            .then_with(|| b.total_photos_count.cmp(&a.total_photos_count))
    });

    for (position, entry) in entries.iter_mut().enumerate() {
        entry.rank = position + 1;
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(user_id: &str, display_name: &str) -> ProfileRecord {
        ProfileRecord {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
        }
    }

    fn photo(owner: &str, species: &str) -> PhotoRecord {
        PhotoRecord {
            owner_user_id: owner.to_string(),
            species_id: species.to_string(),
            hidden_from_feed: false,
        }
    }

    #[test]
    fn counts_unique_species_and_totals() {
        let profiles = vec![profile("u1", "Ann"), profile("u2", "Bo")];
        let photos = vec![
            photo("u1", "robin"),
            photo("u1", "robin"),
            photo("u1", "jay"),
            photo("u2", "robin"),
        ];

        let board = compute_leaderboard(&profiles, &photos);

        assert_eq!(board.len(), 2);
        assert_eq!(board[0].display_name, "Ann");
        assert_eq!(board[0].unique_species_count, 2);
        assert_eq!(board[0].total_photos_count, 3);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[1].display_name, "Bo");
        assert_eq!(board[1].unique_species_count, 1);
        assert_eq!(board[1].total_photos_count, 1);
        assert_eq!(board[1].rank, 2);
    }

    #[test]
    fn is_deterministic_over_a_fixed_snapshot() {
        let profiles = vec![profile("u1", "Ann"), profile("u2", "Bo"), profile("u3", "Cy")];
        let photos = vec![
            photo("u2", "robin"),
            photo("u1", "jay"),
            photo("u3", "owl"),
            photo("u3", "jay"),
        ];

        let first = compute_leaderboard(&profiles, &photos);
        let second = compute_leaderboard(&profiles, &photos);
        assert_eq!(first, second);
    }

    #[test]
    fn total_photos_breaks_species_ties() {
        let profiles = vec![profile("u1", "Ann"), profile("u2", "Bo")];
        let photos = vec![
            photo("u1", "robin"),
            photo("u2", "robin"),
            photo("u2", "robin"),
        ];

        let board = compute_leaderboard(&profiles, &photos);
        assert_eq!(board[0].user_id, "u2");
        assert_eq!(board[1].user_id, "u1");
    }

    #[test]
    fn full_ties_keep_profile_order() {
        let profiles = vec![profile("u2", "Bo"), profile("u1", "Ann")];
        let photos = vec![photo("u1", "robin"), photo("u2", "robin")];

        let board = compute_leaderboard(&profiles, &photos);
        assert_eq!(board[0].user_id, "u2");
        assert_eq!(board[1].user_id, "u1");
    }

    #[test]
    fn ranks_are_dense_even_on_equal_scores() {
        let profiles = vec![profile("u1", "Ann"), profile("u2", "Bo"), profile("u3", "Cy")];
        let photos = vec![
            photo("u1", "robin"),
            photo("u2", "robin"),
            photo("u3", "robin"),
        ];

        let board = compute_leaderboard(&profiles, &photos);
        let ranks: Vec<usize> = board.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn hidden_photos_do_not_count() {
        let profiles = vec![profile("u1", "Ann")];
        let mut hidden = photo("u1", "robin");
        hidden.hidden_from_feed = true;
        let photos = vec![hidden, photo("u1", "jay")];

        let board = compute_leaderboard(&profiles, &photos);
        assert_eq!(board[0].unique_species_count, 1);
        assert_eq!(board[0].total_photos_count, 1);
    }

    #[test]
    fn photos_without_a_profile_are_skipped() {
        let profiles = vec![profile("u1", "Ann")];
        let photos = vec![photo("ghost", "robin"), photo("u1", "jay")];

        let board = compute_leaderboard(&profiles, &photos);
        assert_eq!(board.len(), 1);
        assert_eq!(board[0].total_photos_count, 1);
    }

    #[test]
    fn profiles_without_photos_still_rank() {
        let profiles = vec![profile("u1", "Ann"), profile("u2", "Bo")];
        let photos = vec![photo("u1", "robin")];

        let board = compute_leaderboard(&profiles, &photos);
        assert_eq!(board[1].user_id, "u2");
        assert_eq!(board[1].unique_species_count, 0);
        assert_eq!(board[1].rank, 2);
    }
}
