// Copyright (c) BirdDex Team
// SPDX-License-Identifier: Apache-2.0

use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::error::DomainError;

/// Quest phase in the lifecycle. Derived from the clock at render time,
/// never stored; the progression is monotonic and time-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestPhase {
    Upcoming,
    Active,
    Ended,
}

impl QuestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestPhase::Upcoming => "upcoming",
            QuestPhase::Active => "active",
            QuestPhase::Ended => "ended",
        }
    }
}

/// Classify a quest against an instant. Total: exactly one phase for any
/// input. The start boundary is inclusive-active, the end boundary
/// exclusive-active (`now >= end_time` means ended).
pub fn classify_quest(
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    now: NaiveDateTime,
) -> QuestPhase {
    if now < start_time {
        QuestPhase::Upcoming
    } else if now < end_time {
        QuestPhase::Active
    } else {
        QuestPhase::Ended
    }
}

/// Preconditions for submitting an entry. The duplicate check runs here,
/// before the insert, so callers get a domain error rather than a raw
/// constraint violation; the database unique key remains the backstop.
pub fn validate_entry_submission(
    phase: QuestPhase,
    already_entered: bool,
) -> Result<(), DomainError> {
    if phase != QuestPhase::Active {
        return Err(DomainError::Validation(
            "Entries are only accepted while the quest is active".to_string(),
        ));
    }
    if already_entered {
        return Err(DomainError::DuplicateAction(
            "You already have an entry in this quest".to_string(),
        ));
    }
    Ok(())
}

/// Entries must be the submitter's own photos.
pub fn validate_entry_photo(photo_owner: &str, submitter: &str) -> Result<(), DomainError> {
    if photo_owner != submitter {
        return Err(DomainError::Validation(
            "Only your own photos can be entered in a quest".to_string(),
        ));
    }
    Ok(())
}

/// Voting is open exactly while the quest is active. Voting for one's own
/// entry is permitted.
pub fn validate_vote(phase: QuestPhase) -> Result<(), DomainError> {
    match phase {
        QuestPhase::Active => Ok(()),
        QuestPhase::Upcoming => Err(DomainError::Validation(
            "Voting has not opened yet".to_string(),
        )),
        QuestPhase::Ended => Err(DomainError::Validation(
            "Voting has closed for this quest".to_string(),
        )),
    }
}

/// Group votes into per-entry counts. Votes are (voter, entry) pairs with
/// overwrite semantics: a later vote by the same voter replaces the earlier
/// one, matching the (quest, voter) conflict key in the database. Ties are
/// left unresolved; the winner is externally assigned, never derived here.
pub fn tally_votes<I>(votes: I) -> HashMap<i32, i64>
where
    I: IntoIterator<Item = (String, i32)>,
{
    let mut ballots: HashMap<String, i32> = HashMap::new();
    for (voter, entry_id) in votes {
        ballots.insert(voter, entry_id);
    }

    let mut tally: HashMap<i32, i64> = HashMap::new();
    for entry_id in ballots.into_values() {
        *tally.entry(entry_id).or_insert(0) += 1;
    }
    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn vote(voter: &str, entry_id: i32) -> (String, i32) {
        (voter.to_string(), entry_id)
    }

    #[test]
    fn phase_boundaries() {
        let start = at(2024, 1, 1, 0, 0);
        let end = at(2024, 1, 8, 0, 0);

        assert_eq!(classify_quest(start, end, at(2023, 12, 31, 23, 59)), QuestPhase::Upcoming);
        assert_eq!(classify_quest(start, end, start), QuestPhase::Active);
        assert_eq!(classify_quest(start, end, at(2024, 1, 7, 23, 59)), QuestPhase::Active);
        assert_eq!(classify_quest(start, end, end), QuestPhase::Ended);
        assert_eq!(classify_quest(start, end, at(2024, 2, 1, 0, 0)), QuestPhase::Ended);
    }

    #[test]
    fn entry_submission_requires_active_phase() {
        assert!(validate_entry_submission(QuestPhase::Active, false).is_ok());
        assert!(matches!(
            validate_entry_submission(QuestPhase::Upcoming, false),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            validate_entry_submission(QuestPhase::Ended, false),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn second_entry_is_a_duplicate() {
        assert!(matches!(
            validate_entry_submission(QuestPhase::Active, true),
            Err(DomainError::DuplicateAction(_))
        ));
    }

    #[test]
    fn entries_must_use_own_photos() {
        assert!(validate_entry_photo("u1", "u1").is_ok());
        assert!(matches!(
            validate_entry_photo("u1", "u2"),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn voting_is_rejected_outside_active() {
        assert!(validate_vote(QuestPhase::Active).is_ok());
        assert!(validate_vote(QuestPhase::Upcoming).is_err());
        assert!(validate_vote(QuestPhase::Ended).is_err());
    }

    #[test]
    fn repeating_a_vote_does_not_change_the_tally() {
        let once = tally_votes(vec![vote("v1", 10)]);
        let twice = tally_votes(vec![vote("v1", 10), vote("v1", 10)]);
        assert_eq!(once, twice);
        assert_eq!(twice.get(&10), Some(&1));
    }

    #[test]
    fn revoting_moves_the_vote_and_conserves_the_total() {
        let before = tally_votes(vec![vote("v1", 10), vote("v2", 10)]);
        let after = tally_votes(vec![vote("v1", 10), vote("v2", 10), vote("v1", 20)]);

        assert_eq!(before.get(&10), Some(&2));
        assert_eq!(after.get(&10), Some(&1));
        assert_eq!(after.get(&20), Some(&1));
        assert_eq!(
            before.values().sum::<i64>(),
            after.values().sum::<i64>()
        );
    }

    #[test]
    fn tallies_group_by_entry() {
        let tally = tally_votes(vec![
            vote("v1", 10),
            vote("v2", 20),
            vote("v3", 10),
            vote("v4", 10),
        ]);
        assert_eq!(tally.get(&10), Some(&3));
        assert_eq!(tally.get(&20), Some(&1));
        assert_eq!(tally.len(), 2);
    }
}
