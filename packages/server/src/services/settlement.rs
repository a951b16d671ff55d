use std::collections::{HashMap, HashSet};

use chrono::Utc;
use common::{PickType, RaceStatus, TransactionReason, VoteStatus, scoring, streak};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{ExprTrait, Func};
use sea_orm::*;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entity::{
    contest, contest_entry, contest_race, points_transaction, profile, race, race_entry,
    race_result, vote, vote_pick,
};
use crate::error::AppError;
use crate::models::race::{SettleResponse, VoteSettleFailure};
use crate::notify::NotificationDispatcher;
use crate::services::{badges, rankup};

/// Failure settling a single vote. Never aborts the rest of the race: the
/// vote stays pending and is retried on the next invocation.
#[derive(Debug, thiserror::Error)]
pub enum SettleVoteError {
    #[error("database error: {0}")]
    Db(#[from] DbErr),
    #[error("profile {user_id} not found")]
    MissingProfile { user_id: i32 },
}

/// Immutable scoring context for one race, built once per settlement run.
#[derive(Debug, Clone)]
pub struct RaceContext {
    pub race_id: i32,
    pub grade: Option<String>,
    pub grade_bonus: i32,
    pub winner_entry_id: i32,
    /// finish position per entry that has a matched result
    positions: HashMap<i32, i32>,
    /// popularity at vote close per entry
    popularity: HashMap<i32, Option<i32>>,
    /// entries that can be scored: matched result and not scratched
    scoreable: HashSet<i32>,
}

impl RaceContext {
    pub fn build(
        race: &race::Model,
        entries: &[race_entry::Model],
        results: &[race_result::Model],
    ) -> Result<Self, AppError> {
        if results.is_empty() {
            return Err(AppError::NotSettleable(format!(
                "Race {} has no recorded results",
                race.id
            )));
        }

        let scratched: HashSet<i32> = entries
            .iter()
            .filter(|e| e.is_scratched)
            .map(|e| e.id)
            .collect();
        let positions: HashMap<i32, i32> = results
            .iter()
            .map(|r| (r.race_entry_id, r.finish_position))
            .collect();
        let popularity: HashMap<i32, Option<i32>> =
            entries.iter().map(|e| (e.id, e.popularity)).collect();
        let scoreable: HashSet<i32> = positions
            .keys()
            .filter(|id| !scratched.contains(id))
            .copied()
            .collect();

        let winner_entry_id = results
            .iter()
            .find(|r| r.finish_position == 1)
            .map(|r| r.race_entry_id)
            .ok_or_else(|| {
                AppError::NotSettleable(format!("Race {} has no recorded winner", race.id))
            })?;

        Ok(Self {
            race_id: race.id,
            grade: race.grade.clone(),
            grade_bonus: scoring::grade_bonus(race.grade.as_deref()),
            winner_entry_id,
            positions,
            popularity,
            scoreable,
        })
    }

    fn popularity_of(&self, entry_id: i32) -> Option<i32> {
        self.popularity.get(&entry_id).copied().flatten()
    }
}

/// Planned result for one pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPick {
    pub pick_id: i32,
    pub pick_type: PickType,
    /// `None` when the pick's entry was scratched or has no matched result;
    /// such picks are excluded from scoring entirely.
    pub is_hit: Option<bool>,
    pub points: i32,
}

/// Pure settlement plan for one vote: everything the writes need, computed
/// before anything is touched.
#[derive(Debug, Clone)]
pub struct SettlementPlan {
    pub vote_id: i32,
    pub user_id: i32,
    pub picks: Vec<PlannedPick>,
    /// Pick points (grade bonus included) plus the perfect bonus.
    pub base_points: i32,
    pub is_perfect: bool,
    pub any_hit: bool,
    pub win_hit: bool,
    pub place_hits: i32,
    pub danger_hit: bool,
    pub upset_hit: bool,
    pub top_grade_win: bool,
    pub transactions: Vec<(TransactionReason, i32, String)>,
}

fn reason_for(pick_type: PickType) -> TransactionReason {
    match pick_type {
        PickType::Win => TransactionReason::WinHit,
        PickType::Place => TransactionReason::PlaceHit,
        PickType::Back => TransactionReason::BackHit,
        PickType::Danger => TransactionReason::DangerHit,
    }
}

/// Compute the settlement plan for one vote against the race context.
pub fn plan_vote(
    ctx: &RaceContext,
    vote: &vote::Model,
    picks: &[vote_pick::Model],
) -> SettlementPlan {
    let mut planned = Vec::with_capacity(picks.len());
    let mut transactions = Vec::new();
    let mut base_points = 0;
    let mut scoreable_picks = 0;
    let mut scoreable_hits = 0;
    let mut win_hit = false;
    let mut place_hits = 0;
    let mut danger_hit = false;
    let mut upset_hit = false;

    for pick in picks {
        if !ctx.scoreable.contains(&pick.race_entry_id) {
            planned.push(PlannedPick {
                pick_id: pick.id,
                pick_type: pick.pick_type,
                is_hit: None,
                points: 0,
            });
            continue;
        }
        scoreable_picks += 1;

        let position = ctx.positions[&pick.race_entry_id];
        let popularity = ctx.popularity_of(pick.race_entry_id);
        let score = scoring::score_pick(pick.pick_type, position, popularity);
        let points = if score.hit {
            score.points + ctx.grade_bonus
        } else {
            0
        };

        if score.hit {
            scoreable_hits += 1;
            match pick.pick_type {
                PickType::Win => {
                    win_hit = true;
                    upset_hit = scoring::is_upset(popularity);
                }
                PickType::Place => place_hits += 1,
                PickType::Back => {}
                PickType::Danger => danger_hit = true,
            }

            let grade_label = match (&ctx.grade, ctx.grade_bonus) {
                (Some(grade), bonus) if bonus > 0 => format!(" ({grade} +{bonus})"),
                _ => String::new(),
            };
            transactions.push((
                reason_for(pick.pick_type),
                points,
                format!(
                    "{} hit, finish position {position} +{}P{grade_label}",
                    pick.pick_type, score.points
                ),
            ));
        }

        planned.push(PlannedPick {
            pick_id: pick.id,
            pick_type: pick.pick_type,
            is_hit: Some(score.hit),
            points,
        });
        base_points += points;
    }

    // Perfect requires every scoreable pick to hit, and at least one of them.
    let is_perfect = scoreable_picks > 0 && scoreable_hits == scoreable_picks;
    if is_perfect {
        base_points += scoring::PERFECT_BONUS;
        transactions.push((
            TransactionReason::PerfectBonus,
            scoring::PERFECT_BONUS,
            format!("Perfect vote bonus +{}P", scoring::PERFECT_BONUS),
        ));
    }

    SettlementPlan {
        vote_id: vote.id,
        user_id: vote.user_id,
        picks: planned,
        base_points,
        is_perfect,
        any_hit: scoreable_hits > 0,
        win_hit,
        place_hits,
        danger_hit,
        upset_hit,
        top_grade_win: win_hit && ctx.grade.as_deref() == Some("G1"),
        transactions,
    }
}

/// Settle every pending vote of a race exactly once.
///
/// Safe to re-run: votes already in a terminal state are skipped by the
/// conditional status transition, so a retried trigger distributes nothing
/// twice. A failure on one vote is recorded and does not block the rest.
#[instrument(skip(db, notifier))]
pub async fn settle_race(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    race_id: i32,
) -> Result<SettleResponse, AppError> {
    let race_model = race::Entity::find_by_id(race_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Race {race_id} not found")))?;

    if !race_model.status.is_settleable() {
        return Err(AppError::NotSettleable(format!(
            "Race {race_id} is not ready for settlement (status: {})",
            race_model.status
        )));
    }

    let entries = race_entry::Entity::find()
        .filter(race_entry::Column::RaceId.eq(race_id))
        .all(db)
        .await?;
    let results = race_result::Entity::find()
        .filter(race_result::Column::RaceId.eq(race_id))
        .all(db)
        .await?;
    let ctx = RaceContext::build(&race_model, &entries, &results)?;

    let votes = vote::Entity::find()
        .filter(vote::Column::RaceId.eq(race_id))
        .filter(vote::Column::Status.eq(VoteStatus::Pending))
        .all(db)
        .await?;

    let mut picks_by_vote: HashMap<i32, Vec<vote_pick::Model>> = HashMap::new();
    if !votes.is_empty() {
        let vote_ids: Vec<i32> = votes.iter().map(|v| v.id).collect();
        let picks = vote_pick::Entity::find()
            .filter(vote_pick::Column::VoteId.is_in(vote_ids))
            .all(db)
            .await?;
        for pick in picks {
            picks_by_vote.entry(pick.vote_id).or_default().push(pick);
        }
    }

    // Contest targets are race-level constants; resolve them once.
    let today = Utc::now().date_naive();
    let monthly_contest = contest::Entity::find()
        .filter(contest::Column::ContestType.eq(common::ContestType::Monthly))
        .filter(contest::Column::Status.eq(common::ContestStatus::Active))
        .filter(contest::Column::Period.eq(common::period::period_key(
            common::ContestType::Monthly,
            today,
        )))
        .one(db)
        .await?;
    let weekly_contest = match contest_race::Entity::find()
        .filter(contest_race::Column::RaceId.eq(race_id))
        .one(db)
        .await?
    {
        Some(link) => {
            contest::Entity::find_by_id(link.contest_id)
                .filter(contest::Column::ContestType.eq(common::ContestType::Weekly))
                .filter(contest::Column::Status.eq(common::ContestStatus::Active))
                .one(db)
                .await?
        }
        None => None,
    };

    let mut votes_settled = 0u64;
    let mut points_distributed = 0i64;
    let mut errors = Vec::new();

    for vote_model in &votes {
        let picks = picks_by_vote.remove(&vote_model.id).unwrap_or_default();
        let outcome = settle_one_vote(
            db,
            notifier,
            &ctx,
            vote_model,
            &picks,
            monthly_contest.as_ref(),
            weekly_contest.as_ref(),
        )
        .await;

        match outcome {
            Ok(Some(points)) => {
                votes_settled += 1;
                points_distributed += i64::from(points);
            }
            Ok(None) => {} // already terminal; a concurrent run got there first
            Err(e) => {
                warn!(vote_id = vote_model.id, error = %e, "Failed to settle vote");
                errors.push(VoteSettleFailure {
                    vote_id: vote_model.id,
                    message: e.to_string(),
                });
            }
        }
    }

    transition_race(db, &race_model, RaceStatus::Finished).await?;

    info!(
        race_id,
        votes_settled, points_distributed, "Race settlement complete"
    );

    Ok(SettleResponse {
        race_id,
        votes_settled,
        points_distributed,
        errors,
    })
}

/// Apply a race status transition through the state machine, as a no-op when
/// the race already moved past the target.
pub async fn transition_race(
    db: &DatabaseConnection,
    race_model: &race::Model,
    next: RaceStatus,
) -> Result<(), DbErr> {
    if !race_model.status.can_transition(next) {
        return Ok(());
    }
    race::Entity::update_many()
        .col_expr(race::Column::Status, Expr::value(next))
        .filter(race::Column::Id.eq(race_model.id))
        .filter(race::Column::Status.eq(race_model.status))
        .exec(db)
        .await?;
    Ok(())
}

/// Settle one vote. Returns `Ok(None)` when the vote was already terminal
/// (nothing written), `Ok(Some(points))` after a successful settlement.
async fn settle_one_vote(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    ctx: &RaceContext,
    vote_model: &vote::Model,
    picks: &[vote_pick::Model],
    monthly_contest: Option<&contest::Model>,
    weekly_contest: Option<&contest::Model>,
) -> Result<Option<i32>, SettleVoteError> {
    let profile_model = profile::Entity::find_by_id(vote_model.user_id)
        .one(db)
        .await?
        .ok_or(SettleVoteError::MissingProfile {
            user_id: vote_model.user_id,
        })?;

    let plan = plan_vote(ctx, vote_model, picks);
    let streak_up = streak::advance(
        profile_model.current_streak,
        profile_model.best_streak,
        plan.any_hit,
    );
    let total_points = plan.base_points + streak_up.bonus;
    let now = Utc::now();

    // Terminal transition and per-pick results land atomically. The status
    // filter is the idempotency gate: a concurrent or repeated run sees zero
    // rows affected and performs no side effects.
    let txn = db.begin().await?;
    let updated = vote::Entity::update_many()
        .col_expr(
            vote::Column::Status,
            Expr::value(VoteStatus::settled(plan.any_hit)),
        )
        .col_expr(vote::Column::EarnedPoints, Expr::value(total_points))
        .col_expr(vote::Column::IsPerfect, Expr::value(plan.is_perfect))
        .col_expr(vote::Column::SettledAt, Expr::value(Some(now)))
        .filter(vote::Column::Id.eq(vote_model.id))
        .filter(vote::Column::Status.eq(VoteStatus::Pending))
        .exec(&txn)
        .await?;
    if updated.rows_affected == 0 {
        info!(vote_id = vote_model.id, "Vote already settled, skipping");
        txn.commit().await?;
        return Ok(None);
    }

    for planned in &plan.picks {
        vote_pick::Entity::update_many()
            .col_expr(vote_pick::Column::IsHit, Expr::value(planned.is_hit))
            .col_expr(vote_pick::Column::PointsEarned, Expr::value(planned.points))
            .filter(vote_pick::Column::Id.eq(planned.pick_id))
            .exec(&txn)
            .await?;
    }
    txn.commit().await?;

    let mut ledger = plan.transactions.clone();
    if streak_up.bonus > 0 {
        ledger.push((
            TransactionReason::StreakBonus,
            streak_up.bonus,
            format!("{} consecutive hits bonus +{}P", streak_up.current, streak_up.bonus),
        ));
    }
    if !ledger.is_empty() {
        let rows: Vec<points_transaction::ActiveModel> = ledger
            .into_iter()
            .map(|(reason, amount, description)| points_transaction::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(vote_model.user_id),
                vote_id: Set(Some(vote_model.id)),
                race_id: Set(Some(ctx.race_id)),
                contest_id: Set(None),
                amount: Set(amount),
                reason: Set(reason),
                description: Set(description),
                created_at: Set(now),
            })
            .collect();
        points_transaction::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await?;
    }

    profile::Entity::update_many()
        .col_expr(
            profile::Column::CumulativePoints,
            Expr::col(profile::Column::CumulativePoints).add(total_points),
        )
        .col_expr(
            profile::Column::MonthlyPoints,
            Expr::col(profile::Column::MonthlyPoints).add(total_points),
        )
        .col_expr(
            profile::Column::TotalVotes,
            Expr::col(profile::Column::TotalVotes).add(1),
        )
        .col_expr(
            profile::Column::WinHits,
            Expr::col(profile::Column::WinHits).add(i32::from(plan.win_hit)),
        )
        .col_expr(
            profile::Column::PlaceHits,
            Expr::col(profile::Column::PlaceHits).add(plan.place_hits),
        )
        .col_expr(
            profile::Column::DangerHits,
            Expr::col(profile::Column::DangerHits).add(i32::from(plan.danger_hit)),
        )
        .col_expr(
            profile::Column::CurrentStreak,
            Expr::value(streak_up.current),
        )
        .col_expr(profile::Column::BestStreak, Expr::value(streak_up.best))
        .filter(profile::Column::Id.eq(vote_model.user_id))
        .exec(db)
        .await?;

    if let Some(monthly) = monthly_contest {
        bump_contest_entry(db, monthly, vote_model, total_points, plan.any_hit).await?;
    }
    if let Some(weekly) = weekly_contest {
        bump_contest_entry(db, weekly, vote_model, total_points, plan.any_hit).await?;
    }

    badges::evaluate(
        db,
        notifier,
        vote_model.user_id,
        badges::SettlementFlags {
            upset_hit: plan.upset_hit,
            top_grade_win: plan.top_grade_win,
            ..Default::default()
        },
    )
    .await?;
    rankup::check_rank_up(db, notifier, vote_model.user_id).await?;

    Ok(Some(total_points))
}

/// Fold one settled vote into a contest entry, creating the entry on first
/// contact. Increments go through column expressions so concurrent
/// settlements cannot lose updates.
async fn bump_contest_entry(
    db: &DatabaseConnection,
    contest_model: &contest::Model,
    vote_model: &vote::Model,
    points: i32,
    any_hit: bool,
) -> Result<(), DbErr> {
    let update = || {
        contest_entry::Entity::update_many()
            .col_expr(
                contest_entry::Column::TotalPoints,
                Expr::col(contest_entry::Column::TotalPoints).add(points),
            )
            .col_expr(
                contest_entry::Column::VoteCount,
                Expr::col(contest_entry::Column::VoteCount).add(1),
            )
            .col_expr(
                contest_entry::Column::HitRaceCount,
                Expr::col(contest_entry::Column::HitRaceCount).add(i32::from(any_hit)),
            )
            .col_expr(
                contest_entry::Column::IsEligible,
                Expr::col(contest_entry::Column::VoteCount)
                    .add(1)
                    .gte(contest_model.min_votes),
            )
            .col_expr(
                contest_entry::Column::EarliestVoteAt,
                Func::coalesce([
                    Expr::col(contest_entry::Column::EarliestVoteAt).into(),
                    Expr::value(vote_model.created_at),
                ])
                .into(),
            )
            .filter(contest_entry::Column::ContestId.eq(contest_model.id))
            .filter(contest_entry::Column::UserId.eq(vote_model.user_id))
    };

    let updated = update().exec(db).await?;
    if updated.rows_affected > 0 {
        return Ok(());
    }

    let new_entry = contest_entry::ActiveModel {
        contest_id: Set(contest_model.id),
        user_id: Set(vote_model.user_id),
        total_points: Set(points),
        vote_count: Set(1),
        hit_race_count: Set(i32::from(any_hit)),
        earliest_vote_at: Set(Some(vote_model.created_at)),
        is_eligible: Set(1 >= contest_model.min_votes),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    match contest_entry::Entity::insert(new_entry)
        .exec_without_returning(db)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // A concurrent settlement created the row between our update and
            // insert; fold into it.
            update().exec(db).await?;
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use common::scoring::{DANGER_POINTS, PERFECT_BONUS, PLACE_POINTS};

    fn ts() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 9, 16, 0, 0).unwrap()
    }

    fn race_model(grade: Option<&str>) -> race::Model {
        race::Model {
            id: 1,
            name: "Test Stakes".into(),
            race_date: chrono::NaiveDate::from_ymd_opt(2026, 8, 9).unwrap(),
            post_time: ts(),
            venue: None,
            grade: grade.map(str::to_string),
            status: RaceStatus::VotingClosed,
            created_at: ts(),
        }
    }

    fn entry(id: i32, popularity: Option<i32>, scratched: bool) -> race_entry::Model {
        race_entry::Model {
            id,
            race_id: 1,
            post_number: id,
            horse_name: format!("Horse {id}"),
            popularity,
            is_scratched: scratched,
            created_at: ts(),
        }
    }

    fn result(entry_id: i32, position: i32) -> race_result::Model {
        race_result::Model {
            id: entry_id,
            race_id: 1,
            race_entry_id: entry_id,
            finish_position: position,
            margin: None,
            finish_time: None,
            created_at: ts(),
        }
    }

    fn vote_model(id: i32) -> vote::Model {
        vote::Model {
            id,
            race_id: 1,
            user_id: 7,
            status: VoteStatus::Pending,
            earned_points: 0,
            is_perfect: false,
            like_count: 0,
            created_at: ts(),
            settled_at: None,
        }
    }

    fn pick(id: i32, pick_type: PickType, entry_id: i32) -> vote_pick::Model {
        vote_pick::Model {
            id,
            vote_id: 1,
            race_entry_id: entry_id,
            pick_type,
            is_hit: None,
            points_earned: 0,
        }
    }

    /// Entries 1..=6 with popularity = id; 1 wins, 2 second, 3 third,
    /// 4-6 finish 4th-6th.
    fn plain_ctx() -> RaceContext {
        let entries: Vec<_> = (1..=6).map(|i| entry(i, Some(i), false)).collect();
        let results: Vec<_> = (1..=6).map(|i| result(i, i)).collect();
        RaceContext::build(&race_model(None), &entries, &results).unwrap()
    }

    #[test]
    fn context_requires_results_and_a_winner() {
        let entries = vec![entry(1, Some(1), false)];
        let err = RaceContext::build(&race_model(None), &entries, &[]).unwrap_err();
        assert!(matches!(err, AppError::NotSettleable(_)));

        let err =
            RaceContext::build(&race_model(None), &entries, &[result(1, 2)]).unwrap_err();
        assert!(matches!(err, AppError::NotSettleable(_)));
    }

    #[test]
    fn favored_winner_scores_the_low_tier() {
        // Scenario: win pick on popularity 1 that finishes 1st.
        let ctx = plain_ctx();
        let picks = vec![pick(10, PickType::Win, 1)];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);

        assert!(plan.win_hit);
        assert!(plan.any_hit);
        // Single pick hit => perfect, so the bonus applies on top of 30.
        assert!(plan.is_perfect);
        assert_eq!(plan.base_points, 30 + PERFECT_BONUS);
    }

    #[test]
    fn danger_on_a_placed_runner_scores_nothing() {
        // Scenario: danger pick on a runner that finishes 2nd.
        let ctx = plain_ctx();
        let picks = vec![pick(10, PickType::Win, 3), pick(11, PickType::Danger, 2)];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);

        assert!(!plan.danger_hit);
        assert!(!plan.any_hit);
        assert!(!plan.is_perfect);
        assert_eq!(plan.base_points, 0);
        let danger = plan.picks.iter().find(|p| p.pick_id == 11).unwrap();
        assert_eq!(danger.is_hit, Some(false));
        assert_eq!(danger.points, 0);
    }

    #[test]
    fn danger_pays_when_the_runner_misses_the_placings() {
        let ctx = plain_ctx();
        let picks = vec![pick(10, PickType::Win, 2), pick(11, PickType::Danger, 4)];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);

        assert!(plan.danger_hit);
        assert!(plan.any_hit);
        assert!(!plan.win_hit);
        assert!(!plan.is_perfect); // the win pick missed
        assert_eq!(plan.base_points, DANGER_POINTS);
    }

    #[test]
    fn perfect_bonus_requires_every_pick_to_hit() {
        let ctx = plain_ctx();
        // Win on winner, places on 2nd and 3rd, danger on 4th: all hit.
        let picks = vec![
            pick(10, PickType::Win, 1),
            pick(11, PickType::Place, 2),
            pick(12, PickType::Place, 3),
            pick(13, PickType::Danger, 4),
        ];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);
        assert!(plan.is_perfect);
        assert_eq!(
            plan.base_points,
            30 + PLACE_POINTS * 2 + DANGER_POINTS + PERFECT_BONUS
        );
        // Exactly one perfect-bonus ledger row.
        let bonus_rows = plan
            .transactions
            .iter()
            .filter(|(r, _, _)| *r == TransactionReason::PerfectBonus)
            .count();
        assert_eq!(bonus_rows, 1);

        // Same card but the danger runner places: no bonus even though the
        // missed pick is the danger one.
        let picks = vec![
            pick(10, PickType::Win, 1),
            pick(11, PickType::Place, 2),
            pick(13, PickType::Danger, 3),
        ];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);
        assert!(!plan.is_perfect);
        assert_eq!(plan.base_points, 30 + PLACE_POINTS);
    }

    #[test]
    fn scratched_and_unmatched_entries_are_excluded_not_fatal() {
        let mut entries: Vec<_> = (1..=6).map(|i| entry(i, Some(i), false)).collect();
        entries.push(entry(7, Some(7), true)); // scratched
        entries.push(entry(8, Some(8), false)); // no result row
        let results: Vec<_> = (1..=6).map(|i| result(i, i)).collect();
        let ctx = RaceContext::build(&race_model(None), &entries, &results).unwrap();

        let picks = vec![
            pick(10, PickType::Win, 1),
            pick(11, PickType::Back, 7),
            pick(12, PickType::Back, 8),
        ];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);

        let excluded: Vec<_> = plan.picks.iter().filter(|p| p.is_hit.is_none()).collect();
        assert_eq!(excluded.len(), 2);
        assert!(excluded.iter().all(|p| p.points == 0));
        // Excluded picks don't break perfect: the only scoreable pick hit.
        assert!(plan.is_perfect);
        assert_eq!(plan.base_points, 30 + PERFECT_BONUS);
    }

    #[test]
    fn grade_bonus_applies_per_hit_pick() {
        let entries: Vec<_> = (1..=6).map(|i| entry(i, Some(i), false)).collect();
        let results: Vec<_> = (1..=6).map(|i| result(i, i)).collect();
        let ctx = RaceContext::build(&race_model(Some("G1")), &entries, &results).unwrap();

        let picks = vec![pick(10, PickType::Win, 1), pick(11, PickType::Place, 2)];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);

        // 30 + 30 bonus for the win, 20 + 30 bonus for the place, + perfect.
        assert_eq!(plan.base_points, 60 + 50 + PERFECT_BONUS);
        assert!(plan.top_grade_win);
    }

    #[test]
    fn long_shot_winner_sets_the_upset_flag() {
        let entries: Vec<_> = (1..=12)
            .map(|i| entry(i, Some(i), false))
            .collect::<Vec<_>>();
        // Entry 12 (popularity 12) wins.
        let mut results = vec![result(12, 1), result(1, 2), result(2, 3)];
        results.extend((3..=11).map(|i| result(i, i + 1)));
        let ctx = RaceContext::build(&race_model(None), &entries, &results).unwrap();

        let picks = vec![pick(10, PickType::Win, 12)];
        let plan = plan_vote(&ctx, &vote_model(1), &picks);
        assert!(plan.upset_hit);
        // Ceiling tier payout.
        assert_eq!(plan.base_points, 300 + PERFECT_BONUS);
    }

    #[test]
    fn plan_is_deterministic_for_identical_input() {
        // Two runs over the same context and vote produce identical plans;
        // re-settlement relies on this.
        let ctx = plain_ctx();
        let picks = vec![pick(10, PickType::Win, 1), pick(11, PickType::Back, 5)];
        let a = plan_vote(&ctx, &vote_model(1), &picks);
        let b = plan_vote(&ctx, &vote_model(1), &picks);
        assert_eq!(a.base_points, b.base_points);
        assert_eq!(a.is_perfect, b.is_perfect);
        assert_eq!(a.picks, b.picks);
    }
}
