use chrono::{Duration, Utc};
use sea_orm::*;

use crate::entity::{contest, contest_entry, profile, vote};
use crate::error::AppError;
use crate::models::contest::{StandingEntry, StandingResponse};
use crate::models::ranking::{LikeEntry, LikesLeaderboardResponse};

/// Days of activity the likes leaderboard aggregates over.
pub const LIKES_WINDOW_DAYS: i64 = 30;

/// Assign rank positions to contest entries.
///
/// Eligible entries are ranked by total points descending, then races hit
/// descending, then earliest vote ascending. Ineligible entries follow,
/// unranked, in the same order. Pure so the tie-break rules are testable
/// without a database.
pub fn assign_ranks(mut rows: Vec<(contest_entry::Model, String)>) -> Vec<StandingEntry> {
    rows.sort_by(|(a, _), (b, _)| {
        b.is_eligible
            .cmp(&a.is_eligible)
            .then(b.total_points.cmp(&a.total_points))
            .then(b.hit_race_count.cmp(&a.hit_race_count))
            .then(cmp_earliest(a.earliest_vote_at, b.earliest_vote_at))
    });

    let mut next_rank = 0u32;
    rows.into_iter()
        .map(|(entry, display_name)| {
            let rank = if entry.is_eligible {
                next_rank += 1;
                Some(next_rank)
            } else {
                None
            };
            let hit_rate = if entry.vote_count > 0 {
                f64::from(entry.hit_race_count) / f64::from(entry.vote_count)
            } else {
                0.0
            };
            StandingEntry {
                rank,
                user_id: entry.user_id,
                display_name,
                total_points: entry.total_points,
                vote_count: entry.vote_count,
                hit_race_count: entry.hit_race_count,
                hit_rate,
                is_eligible: entry.is_eligible,
            }
        })
        .collect()
}

// Ascending on time, entries without a timestamp last.
fn cmp_earliest(
    a: Option<chrono::DateTime<Utc>>,
    b: Option<chrono::DateTime<Utc>>,
) -> std::cmp::Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}

/// Ranked standing of one contest. A contest with no entries yields an
/// explicit empty list, not an error.
pub async fn contest_standing(
    db: &DatabaseConnection,
    contest_id: i32,
) -> Result<StandingResponse, AppError> {
    let contest_model = contest::Entity::find_by_id(contest_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Contest {contest_id} not found")))?;

    let rows: Vec<(contest_entry::Model, Option<profile::Model>)> = contest_entry::Entity::find()
        .filter(contest_entry::Column::ContestId.eq(contest_id))
        .find_also_related(profile::Entity)
        .all(db)
        .await?;

    let entries = assign_ranks(
        rows.into_iter()
            .map(|(entry, prof)| {
                let name = prof.map(|p| p.display_name).unwrap_or_default();
                (entry, name)
            })
            .collect(),
    );

    Ok(StandingResponse {
        contest_id: contest_model.id,
        name: contest_model.name,
        contest_type: contest_model.contest_type,
        status: contest_model.status,
        period: contest_model.period,
        entries,
    })
}

/// Standing of the currently active contest of a type, if any.
pub async fn active_contest_standing(
    db: &DatabaseConnection,
    contest_type: common::ContestType,
) -> Result<Option<StandingResponse>, AppError> {
    let active = contest::Entity::find()
        .filter(contest::Column::ContestType.eq(contest_type))
        .filter(contest::Column::Status.eq(common::ContestStatus::Active))
        .order_by_desc(contest::Column::StartedAt)
        .one(db)
        .await?;

    match active {
        Some(c) => Ok(Some(contest_standing(db, c.id).await?)),
        None => Ok(None),
    }
}

/// Engagement leaderboard: likes received on votes submitted in the
/// trailing window, summed per user. The rate-style numbers are derived at
/// query time, never stored.
pub async fn likes_leaderboard(
    db: &DatabaseConnection,
    limit: u64,
) -> Result<LikesLeaderboardResponse, AppError> {
    let cutoff = Utc::now() - Duration::days(LIKES_WINDOW_DAYS);

    let mut sums: Vec<(i32, i64)> = vote::Entity::find()
        .select_only()
        .column(vote::Column::UserId)
        .column_as(vote::Column::LikeCount.sum(), "likes")
        .filter(vote::Column::CreatedAt.gte(cutoff))
        .group_by(vote::Column::UserId)
        .into_tuple()
        .all(db)
        .await?;

    sums.retain(|(_, likes)| *likes > 0);
    sums.sort_by(|a, b| b.1.cmp(&a.1));
    sums.truncate(limit as usize);

    let user_ids: Vec<i32> = sums.iter().map(|(id, _)| *id).collect();
    let names: std::collections::HashMap<i32, String> = if user_ids.is_empty() {
        Default::default()
    } else {
        profile::Entity::find()
            .filter(profile::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|p| (p.id, p.display_name))
            .collect()
    };

    let entries = sums
        .into_iter()
        .enumerate()
        .map(|(i, (user_id, likes))| LikeEntry {
            rank: i as u32 + 1,
            user_id,
            display_name: names.get(&user_id).cloned().unwrap_or_default(),
            likes,
        })
        .collect();

    Ok(LikesLeaderboardResponse {
        window_days: LIKES_WINDOW_DAYS,
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(
        user_id: i32,
        total_points: i32,
        hit_race_count: i32,
        earliest_min: Option<u32>,
        is_eligible: bool,
    ) -> (contest_entry::Model, String) {
        (
            contest_entry::Model {
                id: user_id,
                contest_id: 1,
                user_id,
                total_points,
                vote_count: 5,
                hit_race_count,
                earliest_vote_at: earliest_min
                    .map(|m| Utc.with_ymd_and_hms(2026, 8, 3, 9, m, 0).unwrap()),
                is_eligible,
                created_at: Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap(),
            },
            format!("user{user_id}"),
        )
    }

    #[test]
    fn ranks_by_points_descending() {
        let out = assign_ranks(vec![
            entry(1, 100, 1, Some(0), true),
            entry(2, 300, 1, Some(0), true),
            entry(3, 200, 1, Some(0), true),
        ]);
        let order: Vec<i32> = out.iter().map(|e| e.user_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
        assert_eq!(out[0].rank, Some(1));
        assert_eq!(out[2].rank, Some(3));
    }

    #[test]
    fn ties_break_on_hit_races_then_earliest_vote() {
        let out = assign_ranks(vec![
            entry(1, 100, 2, Some(30), true),
            entry(2, 100, 3, Some(30), true), // more races hit wins the tie
            entry(3, 100, 2, Some(10), true), // earlier vote beats user 1
        ]);
        let order: Vec<i32> = out.iter().map(|e| e.user_id).collect();
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn ineligible_entries_are_listed_unranked_after_the_field() {
        let out = assign_ranks(vec![
            entry(1, 50, 1, Some(0), true),
            entry(2, 999, 9, Some(0), false), // big score but under min votes
        ]);
        assert_eq!(out[0].user_id, 1);
        assert_eq!(out[0].rank, Some(1));
        assert_eq!(out[1].user_id, 2);
        assert_eq!(out[1].rank, None);
    }

    #[test]
    fn empty_input_yields_an_empty_standing() {
        assert!(assign_ranks(vec![]).is_empty());
    }

    #[test]
    fn hit_rate_is_derived_from_counts() {
        let out = assign_ranks(vec![entry(1, 100, 3, Some(0), true)]);
        assert!((out[0].hit_rate - 0.6).abs() < f64::EPSILON);
    }
}
