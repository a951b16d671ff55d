use serde::{Deserialize, Serialize};

use super::contest::StandingEntry;
use common::ContestType;

/// Leaderboard for the currently active contest of one type. `contest_id`
/// is `None` (with empty entries) when no contest is active — the explicit
/// empty state.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LeaderboardResponse {
    pub contest_type: ContestType,
    pub contest_id: Option<i32>,
    pub entries: Vec<StandingEntry>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikeEntry {
    pub rank: u32,
    pub user_id: i32,
    pub display_name: String,
    pub likes: i64,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct LikesLeaderboardResponse {
    /// Window the engagement counts were aggregated over, in days.
    pub window_days: i64,
    pub entries: Vec<LikeEntry>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RankQuery {
    /// Cumulative points to resolve into a rank.
    pub points: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct RankResponse {
    pub rank_id: String,
    pub name: String,
    pub threshold: i32,
    /// Next rank up the ladder, absent at the top.
    pub next: Option<NextRank>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct NextRank {
    pub rank_id: String,
    pub name: String,
    pub threshold: i32,
    pub points_to_go: i32,
}
