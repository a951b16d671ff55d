use axum::Json;
use axum::extract::{Query, State};
use common::ContestType;
use common::rank::{next_rank, rank_for_points};
use tracing::instrument;

use crate::error::AppError;
use crate::models::ranking::{
    LeaderboardResponse, LikesLeaderboardResponse, NextRank, RankQuery, RankResponse,
};
use crate::models::shared::{LeaderboardQuery, clamp_limit};
use crate::services::leaderboard;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/weekly",
    tag = "Rankings",
    operation_id = "weeklyLeaderboard",
    summary = "Standing of the active weekly contest",
    description = "Explicit empty state (null contest_id, no entries) when no weekly contest is active.",
    responses((status = 200, description = "Weekly leaderboard", body = LeaderboardResponse)),
)]
#[instrument(skip(state))]
pub async fn weekly_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    active_leaderboard(&state, ContestType::Weekly).await
}

#[utoipa::path(
    get,
    path = "/monthly",
    tag = "Rankings",
    operation_id = "monthlyLeaderboard",
    summary = "Standing of the active monthly contest",
    description = "Explicit empty state (null contest_id, no entries) when no monthly contest is active.",
    responses((status = 200, description = "Monthly leaderboard", body = LeaderboardResponse)),
)]
#[instrument(skip(state))]
pub async fn monthly_leaderboard(
    State(state): State<AppState>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    active_leaderboard(&state, ContestType::Monthly).await
}

async fn active_leaderboard(
    state: &AppState,
    contest_type: ContestType,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let standing = leaderboard::active_contest_standing(&state.db, contest_type).await?;
    Ok(Json(match standing {
        Some(s) => LeaderboardResponse {
            contest_type,
            contest_id: Some(s.contest_id),
            entries: s.entries,
        },
        None => LeaderboardResponse {
            contest_type,
            contest_id: None,
            entries: Vec::new(),
        },
    }))
}

#[utoipa::path(
    get,
    path = "/likes",
    tag = "Rankings",
    operation_id = "likesLeaderboard",
    summary = "Engagement leaderboard",
    description = "Likes received on votes submitted in the trailing 30 days, summed per user and ranked descending.",
    params(LeaderboardQuery),
    responses((status = 200, description = "Likes leaderboard", body = LikesLeaderboardResponse)),
)]
#[instrument(skip(state, query))]
pub async fn likes_leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LikesLeaderboardResponse>, AppError> {
    let board = leaderboard::likes_leaderboard(&state.db, clamp_limit(query.limit)).await?;
    Ok(Json(board))
}

#[utoipa::path(
    get,
    path = "/rank",
    tag = "Rankings",
    operation_id = "getUserRank",
    summary = "Resolve cumulative points to a rank",
    description = "Pure lookup over the rank ladder, exposed for display purposes.",
    params(RankQuery),
    responses((status = 200, description = "Rank for the given points", body = RankResponse)),
)]
#[instrument(skip(query), fields(points = query.points))]
pub async fn get_user_rank(Query(query): Query<RankQuery>) -> Json<RankResponse> {
    let rank = rank_for_points(query.points);
    Json(RankResponse {
        rank_id: rank.id.to_string(),
        name: rank.name.to_string(),
        threshold: rank.threshold,
        next: next_rank(rank.id).map(|n| NextRank {
            rank_id: n.id.to_string(),
            name: n.name.to_string(),
            threshold: n.threshold,
            points_to_go: (n.threshold - query.points).max(0),
        }),
    })
}
