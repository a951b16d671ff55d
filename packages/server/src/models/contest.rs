use common::{ContestStatus, ContestType};
use serde::Serialize;

/// Outcome of an idempotent scheduled contest-create call. `created` is
/// false when the period's contest already existed; the id is returned
/// either way.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CronContestResponse {
    pub contest_id: i32,
    pub contest_type: ContestType,
    pub period: String,
    pub created: bool,
    pub linked_races: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MonthlyResetResponse {
    /// Entries snapshotted into the closed contest.
    pub snapshot_entries: usize,
    /// Profiles whose monthly points were zeroed.
    pub reset_profiles: u64,
    /// Users auto-enrolled into the new contest.
    pub enrolled: usize,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StandingEntry {
    /// 1-based position among eligible entries; `None` for entries below
    /// the contest's minimum vote count.
    pub rank: Option<u32>,
    pub user_id: i32,
    pub display_name: String,
    pub total_points: i32,
    pub vote_count: i32,
    pub hit_race_count: i32,
    /// Races hit over races voted, derived at query time and never stored.
    pub hit_rate: f64,
    pub is_eligible: bool,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct StandingResponse {
    pub contest_id: i32,
    pub name: String,
    pub contest_type: ContestType,
    pub status: ContestStatus,
    pub period: String,
    pub entries: Vec<StandingEntry>,
}
