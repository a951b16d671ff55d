use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use common::{PickType, VoteStatus};
use serde::{Deserialize, Serialize};

use crate::entity::{race, race_entry, vote, vote_pick};
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct PickRequest {
    pub pick_type: PickType,
    pub race_entry_id: i32,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitVoteRequest {
    /// Account id, already authenticated by the fronting gateway.
    pub user_id: i32,
    pub picks: Vec<PickRequest>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

#[derive(Serialize, utoipa::ToSchema)]
pub struct VotePickResponse {
    pub id: i32,
    pub pick_type: PickType,
    pub race_entry_id: i32,
    pub is_hit: Option<bool>,
    pub points_earned: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct VoteResponse {
    pub id: i32,
    pub race_id: i32,
    pub user_id: i32,
    pub status: VoteStatus,
    pub earned_points: i32,
    pub is_perfect: bool,
    pub picks: Vec<VotePickResponse>,
    pub created_at: DateTime<Utc>,
}

impl VoteResponse {
    pub fn from_models(vote: vote::Model, picks: Vec<vote_pick::Model>) -> Self {
        Self {
            id: vote.id,
            race_id: vote.race_id,
            user_id: vote.user_id,
            status: vote.status,
            earned_points: vote.earned_points,
            is_perfect: vote.is_perfect,
            picks: picks
                .into_iter()
                .map(|p| VotePickResponse {
                    id: p.id,
                    pick_type: p.pick_type,
                    race_entry_id: p.race_entry_id,
                    is_hit: p.is_hit,
                    points_earned: p.points_earned,
                })
                .collect(),
            created_at: vote.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Pick validation
// ---------------------------------------------------------------------------

/// Validate a candidate pick set against race state and cardinality rules.
///
/// Checks run in a fixed order and the first broken rule is reported; on
/// failure nothing is written. `close_margin` is the safety margin before
/// post time after which submissions are rejected.
pub fn validate_pick_set(
    picks: &[PickRequest],
    race: &race::Model,
    entries: &[race_entry::Model],
    now: DateTime<Utc>,
    close_margin: Duration,
) -> Result<(), AppError> {
    if race.status != common::RaceStatus::VotingOpen {
        return Err(AppError::Validation(format!(
            "Race is not open for voting (status: {})",
            race.status
        )));
    }
    if now + close_margin > race.post_time {
        return Err(AppError::Validation(
            "Voting for this race has closed".into(),
        ));
    }

    let mut counts: HashMap<PickType, usize> = HashMap::new();
    for pick in picks {
        *counts.entry(pick.pick_type).or_default() += 1;
    }
    for &pick_type in PickType::ALL {
        let (min, max) = pick_type.cardinality();
        let count = counts.get(&pick_type).copied().unwrap_or(0);
        if count < min || count > max {
            return Err(AppError::Validation(format!(
                "A vote must contain between {min} and {max} {pick_type} picks, got {count}"
            )));
        }
    }

    let win_entry = picks
        .iter()
        .find(|p| p.pick_type == PickType::Win)
        .map(|p| p.race_entry_id);
    let danger_entry = picks
        .iter()
        .find(|p| p.pick_type == PickType::Danger)
        .map(|p| p.race_entry_id);
    if win_entry.is_some() && win_entry == danger_entry {
        return Err(AppError::Validation(
            "The same runner cannot be picked as both win and danger".into(),
        ));
    }

    let mut seen: HashSet<(PickType, i32)> = HashSet::new();
    for pick in picks {
        if !seen.insert((pick.pick_type, pick.race_entry_id)) {
            return Err(AppError::Validation(format!(
                "Entry {} appears twice as a {} pick",
                pick.race_entry_id, pick.pick_type
            )));
        }
    }

    let by_id: HashMap<i32, &race_entry::Model> = entries.iter().map(|e| (e.id, e)).collect();
    for pick in picks {
        match by_id.get(&pick.race_entry_id) {
            None => {
                return Err(AppError::Validation(format!(
                    "Entry {} does not belong to race {}",
                    pick.race_entry_id, race.id
                )));
            }
            Some(entry) if entry.is_scratched => {
                return Err(AppError::Validation(format!(
                    "Entry {} ({}) is scratched",
                    entry.id, entry.horse_name
                )));
            }
            Some(_) => {}
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::RaceStatus;

    fn race(status: RaceStatus) -> race::Model {
        race::Model {
            id: 1,
            name: "Test Stakes".into(),
            race_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            post_time: Utc.with_ymd_and_hms(2026, 8, 9, 15, 40, 0).unwrap(),
            venue: None,
            grade: None,
            status,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    fn entry(id: i32, scratched: bool) -> race_entry::Model {
        race_entry::Model {
            id,
            race_id: 1,
            post_number: id,
            horse_name: format!("Horse {id}"),
            popularity: Some(id),
            is_scratched: scratched,
            created_at: Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap(),
        }
    }

    fn entries() -> Vec<race_entry::Model> {
        (1..=8).map(|i| entry(i, false)).collect()
    }

    fn pick(pick_type: PickType, race_entry_id: i32) -> PickRequest {
        PickRequest {
            pick_type,
            race_entry_id,
        }
    }

    fn early() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 9, 12, 0, 0).unwrap()
    }

    fn margin() -> Duration {
        Duration::minutes(5)
    }

    #[test]
    fn accepts_a_full_valid_pick_set() {
        let picks = vec![
            pick(PickType::Win, 1),
            pick(PickType::Place, 2),
            pick(PickType::Place, 3),
            pick(PickType::Back, 4),
            pick(PickType::Back, 5),
            pick(PickType::Danger, 6),
        ];
        assert!(
            validate_pick_set(&picks, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_ok()
        );
    }

    #[test]
    fn accepts_the_minimal_pick_set() {
        let picks = vec![pick(PickType::Win, 1)];
        assert!(
            validate_pick_set(&picks, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_ok()
        );
    }

    #[test]
    fn rejects_when_race_is_not_open() {
        for status in [
            RaceStatus::Upcoming,
            RaceStatus::VotingClosed,
            RaceStatus::Finished,
        ] {
            let err =
                validate_pick_set(&[pick(PickType::Win, 1)], &race(status), &entries(), early(), margin())
                    .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn rejects_inside_the_close_margin() {
        // Post time 15:40, margin 5 min: 15:36 is too late.
        let late = Utc.with_ymd_and_hms(2026, 8, 9, 15, 36, 0).unwrap();
        let err = validate_pick_set(
            &[pick(PickType::Win, 1)],
            &race(RaceStatus::VotingOpen),
            &entries(),
            late,
            margin(),
        )
        .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error")
        };
        assert!(msg.contains("closed"));
    }

    #[test]
    fn rejects_missing_or_duplicate_win() {
        let err = validate_pick_set(
            &[pick(PickType::Place, 2)],
            &race(RaceStatus::VotingOpen),
            &entries(),
            early(),
            margin(),
        )
        .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error")
        };
        assert!(msg.contains("win"));

        let err = validate_pick_set(
            &[pick(PickType::Win, 1), pick(PickType::Win, 2)],
            &race(RaceStatus::VotingOpen),
            &entries(),
            early(),
            margin(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_too_many_place_back_or_danger_picks() {
        let too_many_place = vec![
            pick(PickType::Win, 1),
            pick(PickType::Place, 2),
            pick(PickType::Place, 3),
            pick(PickType::Place, 4),
        ];
        assert!(
            validate_pick_set(&too_many_place, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_err()
        );

        let mut too_many_back = vec![pick(PickType::Win, 1)];
        too_many_back.extend((2..=7).map(|i| pick(PickType::Back, i)));
        assert!(
            validate_pick_set(&too_many_back, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_err()
        );

        let two_dangers = vec![
            pick(PickType::Win, 1),
            pick(PickType::Danger, 2),
            pick(PickType::Danger, 3),
        ];
        assert!(
            validate_pick_set(&two_dangers, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_err()
        );
    }

    #[test]
    fn rejects_win_and_danger_on_the_same_runner() {
        let picks = vec![pick(PickType::Win, 1), pick(PickType::Danger, 1)];
        let err =
            validate_pick_set(&picks, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error")
        };
        assert!(msg.contains("both win and danger"));
    }

    #[test]
    fn rejects_the_same_entry_twice_in_one_type() {
        let picks = vec![
            pick(PickType::Win, 1),
            pick(PickType::Back, 2),
            pick(PickType::Back, 2),
        ];
        assert!(
            validate_pick_set(&picks, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .is_err()
        );
    }

    #[test]
    fn rejects_foreign_and_scratched_entries() {
        let picks = vec![pick(PickType::Win, 99)];
        let err =
            validate_pick_set(&picks, &race(RaceStatus::VotingOpen), &entries(), early(), margin())
                .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error")
        };
        assert!(msg.contains("does not belong"));

        let mut with_scratch = entries();
        with_scratch[0].is_scratched = true;
        let picks = vec![pick(PickType::Win, 1)];
        let err = validate_pick_set(
            &picks,
            &race(RaceStatus::VotingOpen),
            &with_scratch,
            early(),
            margin(),
        )
        .unwrap_err();
        let AppError::Validation(msg) = err else {
            panic!("expected validation error")
        };
        assert!(msg.contains("scratched"));
    }
}
