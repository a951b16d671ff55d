use axum::Json;
use axum::extract::{Path, State};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, instrument};

use crate::entity::race_entry;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::race::{
    BackfillFailure, BackfillPopularityRequest, BackfillPopularityResponse, SettleResponse,
    validate_backfill,
};
use crate::services::settlement;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/{id}/settle",
    tag = "Settlement",
    operation_id = "settleRace",
    summary = "Settle every pending vote of a race",
    description = "Converts every pending vote into a terminal hit/miss state with awarded points, updates profile aggregates, contest entries, streaks, badges, and ranks. Idempotent: votes already settled are skipped, so re-running a retried trigger never double-awards points. Per-vote failures are reported in the response and do not block the remaining votes.",
    params(("id" = i32, Path, description = "Race ID")),
    responses(
        (status = 200, description = "Settlement report", body = SettleResponse),
        (status = 404, description = "Race not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Race not ready for settlement (NOT_SETTLEABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(race_id))]
pub async fn settle_race(
    State(state): State<AppState>,
    Path(race_id): Path<i32>,
) -> Result<Json<SettleResponse>, AppError> {
    let report = settlement::settle_race(&state.db, state.notifier.as_ref(), race_id).await?;
    Ok(Json(report))
}

#[utoipa::path(
    put,
    path = "/{id}/entries/popularity",
    tag = "Races",
    operation_id = "backfillPopularity",
    summary = "Backfill popularity onto race entries",
    description = "Bulk-writes popularity values captured at vote close. Partial-batch semantics: an entry that does not belong to the race or carries an invalid popularity is reported in `failed` while the rest of the batch is applied.",
    params(("id" = i32, Path, description = "Race ID")),
    request_body = BackfillPopularityRequest,
    responses(
        (status = 200, description = "Per-item results", body = BackfillPopularityResponse),
        (status = 400, description = "Malformed batch (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(race_id, items = payload.items.len()))]
pub async fn backfill_popularity(
    State(state): State<AppState>,
    Path(race_id): Path<i32>,
    AppJson(payload): AppJson<BackfillPopularityRequest>,
) -> Result<Json<BackfillPopularityResponse>, AppError> {
    validate_backfill(&payload)?;

    let mut updated = 0usize;
    let mut failed = Vec::new();

    for item in &payload.items {
        if item.popularity < 1 {
            failed.push(BackfillFailure {
                race_entry_id: item.race_entry_id,
                message: format!("popularity must be >= 1, got {}", item.popularity),
            });
            continue;
        }

        let result = race_entry::Entity::update_many()
            .col_expr(
                race_entry::Column::Popularity,
                Expr::value(Some(item.popularity)),
            )
            .filter(race_entry::Column::Id.eq(item.race_entry_id))
            .filter(race_entry::Column::RaceId.eq(race_id))
            .exec(&state.db)
            .await;

        match result {
            Ok(r) if r.rows_affected > 0 => updated += 1,
            Ok(_) => failed.push(BackfillFailure {
                race_entry_id: item.race_entry_id,
                message: format!("entry not found in race {race_id}"),
            }),
            // One bad item never aborts the batch.
            Err(e) => failed.push(BackfillFailure {
                race_entry_id: item.race_entry_id,
                message: e.to_string(),
            }),
        }
    }

    info!(race_id, updated, failed = failed.len(), "Popularity backfill");
    Ok(Json(BackfillPopularityResponse { updated, failed }))
}
