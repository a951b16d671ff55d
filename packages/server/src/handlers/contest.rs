use axum::Json;
use axum::extract::{Path, State};
use chrono::Utc;
use common::ContestType;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::scheduler::SchedulerAuth;
use crate::models::contest::{CronContestResponse, MonthlyResetResponse, StandingResponse};
use crate::services::{contest, leaderboard};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/{id}/standing",
    tag = "Contests",
    operation_id = "getContestStanding",
    summary = "Ranked standing of a contest",
    description = "Entries ranked by total points descending, tie-broken by races hit descending, then earliest vote ascending. Entries below the contest's minimum vote count appear unranked after the field. A contest with no entries returns an empty list.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest standing", body = StandingResponse),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(contest_id))]
pub async fn get_standing(
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<Json<StandingResponse>, AppError> {
    let standing = leaderboard::contest_standing(&state.db, contest_id).await?;
    Ok(Json(standing))
}

#[utoipa::path(
    post,
    path = "/contests/{contest_type}",
    tag = "Scheduler",
    operation_id = "cronCreateContest",
    summary = "Create the contest for the current period",
    description = "Scheduler-only (Bearer shared secret). Idempotent: re-running for the same period returns the existing contest id and writes nothing. Creating a new contest closes and rewards any still-active contest of the same type; weekly contests get the week's graded races linked as qualifying races.",
    params(("contest_type" = String, Path, description = "weekly or monthly")),
    responses(
        (status = 200, description = "Contest ensured", body = CronContestResponse),
        (status = 400, description = "Unknown contest type (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Missing or invalid scheduler secret (SCHEDULER_UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _auth))]
pub async fn cron_create_contest(
    _auth: SchedulerAuth,
    State(state): State<AppState>,
    Path(contest_type): Path<String>,
) -> Result<Json<CronContestResponse>, AppError> {
    let contest_type: ContestType = contest_type
        .parse()
        .map_err(|e: common::status::ParseEnumError| AppError::Validation(e.to_string()))?;

    let outcome = contest::ensure_contest(
        &state.db,
        state.notifier.as_ref(),
        &state.config,
        contest_type,
        Utc::now().date_naive(),
    )
    .await?;

    Ok(Json(CronContestResponse {
        contest_id: outcome.contest_id,
        contest_type,
        period: outcome.period,
        created: outcome.created,
        linked_races: outcome.linked_races,
    }))
}

#[utoipa::path(
    post,
    path = "/contests/monthly/reset",
    tag = "Scheduler",
    operation_id = "cronMonthlyReset",
    summary = "Snapshot and zero monthly points",
    description = "Scheduler-only (Bearer shared secret). Snapshots every profile with nonzero monthly points into the just-closed monthly contest, zeroes those counters, appends one zero-amount audit ledger row per affected user, and auto-enrolls users active in the trailing 30 days into the new contest. All writes are chunked and keyed for safe re-runs; profiles already at zero are untouched.",
    responses(
        (status = 200, description = "Reset report", body = MonthlyResetResponse),
        (status = 401, description = "Missing or invalid scheduler secret (SCHEDULER_UNAUTHORIZED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, _auth))]
pub async fn cron_monthly_reset(
    _auth: SchedulerAuth,
    State(state): State<AppState>,
) -> Result<Json<MonthlyResetResponse>, AppError> {
    let report = contest::monthly_reset(&state.db, &state.config, Utc::now().date_naive()).await?;
    Ok(Json(report))
}
