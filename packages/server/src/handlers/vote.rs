use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{Duration, Utc};
use common::VoteStatus;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{profile, race, race_entry, vote, vote_pick};
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::vote::{SubmitVoteRequest, VoteResponse, validate_pick_set};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/votes",
    tag = "Votes",
    operation_id = "submitVote",
    summary = "Submit a pick set for a race",
    description = "Validates the pick set against race state and cardinality rules, then stores the vote atomically. The race must be open for voting and outside the pre-post safety margin. One vote per user per race; a second submission returns 409. On validation failure nothing is written and the first broken rule is named.",
    params(("id" = i32, Path, description = "Race ID")),
    request_body = SubmitVoteRequest,
    responses(
        (status = 201, description = "Vote accepted", body = VoteResponse),
        (status = 400, description = "Invalid pick set (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "Race or profile not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Vote already submitted (CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(race_id, user_id = payload.user_id))]
pub async fn submit_vote(
    State(state): State<AppState>,
    Path(race_id): Path<i32>,
    AppJson(payload): AppJson<SubmitVoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    let race_model = race::Entity::find_by_id(race_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Race {race_id} not found")))?;

    let entries = race_entry::Entity::find()
        .filter(race_entry::Column::RaceId.eq(race_id))
        .all(&state.db)
        .await?;

    validate_pick_set(
        &payload.picks,
        &race_model,
        &entries,
        Utc::now(),
        Duration::minutes(state.config.settlement.close_margin_mins),
    )?;

    profile::Entity::find_by_id(payload.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", payload.user_id)))?;

    let txn = state.db.begin().await?;

    let now = Utc::now();
    let new_vote = vote::ActiveModel {
        race_id: Set(race_id),
        user_id: Set(payload.user_id),
        status: Set(VoteStatus::Pending),
        earned_points: Set(0),
        is_perfect: Set(false),
        like_count: Set(0),
        created_at: Set(now),
        settled_at: Set(None),
        ..Default::default()
    };

    let vote_model = match new_vote.insert(&txn).await {
        Ok(m) => m,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict(
                "A vote for this race already exists".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let picks: Vec<vote_pick::ActiveModel> = payload
        .picks
        .iter()
        .map(|p| vote_pick::ActiveModel {
            vote_id: Set(vote_model.id),
            race_entry_id: Set(p.race_entry_id),
            pick_type: Set(p.pick_type),
            is_hit: Set(None),
            points_earned: Set(0),
            ..Default::default()
        })
        .collect();
    vote_pick::Entity::insert_many(picks)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    let stored_picks = vote_pick::Entity::find()
        .filter(vote_pick::Column::VoteId.eq(vote_model.id))
        .all(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(VoteResponse::from_models(vote_model, stored_picks)),
    ))
}
