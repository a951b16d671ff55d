use chrono::{Duration, NaiveDate, Utc};
use common::period::{contest_name, month_start, period_key, previous_monthly_key, week_end, week_start};
use common::{ContestStatus, ContestType, TransactionReason};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::entity::{contest, contest_entry, contest_race, points_transaction, profile, race, vote};
use crate::error::AppError;
use crate::models::contest::MonthlyResetResponse;
use crate::notify::NotificationDispatcher;
use crate::services::badges;

/// Outcome of an idempotent contest-create call.
#[derive(Debug, Clone)]
pub struct EnsureOutcome {
    pub contest_id: i32,
    pub period: String,
    pub created: bool,
    pub linked_races: usize,
}

/// Create the contest for the period containing `today`, if it does not
/// already exist. Re-running for the same period returns the existing id
/// and writes nothing. Creating a new contest first closes (and rewards)
/// any still-active contest of the same type.
#[instrument(skip(db, notifier, config))]
pub async fn ensure_contest(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    config: &AppConfig,
    contest_type: ContestType,
    today: NaiveDate,
) -> Result<EnsureOutcome, AppError> {
    let period = period_key(contest_type, today);

    if let Some(existing) = find_by_period(db, contest_type, &period).await? {
        info!(contest_id = existing.id, %period, "Contest already exists");
        return Ok(EnsureOutcome {
            contest_id: existing.id,
            period,
            created: false,
            linked_races: 0,
        });
    }

    // Close out whatever is still running for this cadence.
    let stale = contest::Entity::find()
        .filter(contest::Column::ContestType.eq(contest_type))
        .filter(contest::Column::Status.eq(ContestStatus::Active))
        .all(db)
        .await?;
    for old in &stale {
        close_and_reward(db, notifier, config, old).await?;
    }

    let min_votes = match contest_type {
        ContestType::Weekly => config.contest.weekly_min_votes,
        ContestType::Monthly => config.contest.monthly_min_votes,
    };
    let start = match contest_type {
        ContestType::Weekly => week_start(today),
        ContestType::Monthly => month_start(today),
    };
    let now = Utc::now();

    let new_contest = contest::ActiveModel {
        name: Set(contest_name(contest_type, today)),
        contest_type: Set(contest_type),
        status: Set(ContestStatus::Active),
        period: Set(period.clone()),
        min_votes: Set(min_votes),
        prize_first: Set(5000),
        prize_second: Set(3000),
        prize_third: Set(2000),
        started_at: Set(start.and_time(chrono::NaiveTime::MIN).and_utc()),
        created_at: Set(now),
        ..Default::default()
    };

    let model = match new_contest.insert(db).await {
        Ok(m) => m,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            // A concurrent scheduled trigger created it first.
            let existing = find_by_period(db, contest_type, &period)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Contest ({contest_type}, {period}) conflicted but not found"
                    ))
                })?;
            return Ok(EnsureOutcome {
                contest_id: existing.id,
                period,
                created: false,
                linked_races: 0,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let linked_races = match contest_type {
        ContestType::Weekly => link_qualifying_races(db, model.id, today).await?,
        ContestType::Monthly => 0,
    };

    info!(contest_id = model.id, %period, linked_races, "Created contest");
    Ok(EnsureOutcome {
        contest_id: model.id,
        period,
        created: true,
        linked_races,
    })
}

async fn find_by_period(
    db: &DatabaseConnection,
    contest_type: ContestType,
    period: &str,
) -> Result<Option<contest::Model>, DbErr> {
    contest::Entity::find()
        .filter(contest::Column::ContestType.eq(contest_type))
        .filter(contest::Column::Period.eq(period))
        .one(db)
        .await
}

/// Link the week's graded races to a weekly contest, ordered by post time.
/// Conflict-ignoring inserts make a re-run a no-op.
async fn link_qualifying_races(
    db: &DatabaseConnection,
    contest_id: i32,
    today: NaiveDate,
) -> Result<usize, DbErr> {
    let races = race::Entity::find()
        .filter(race::Column::RaceDate.between(week_start(today), week_end(today)))
        .filter(race::Column::Grade.is_not_null())
        .order_by_asc(race::Column::PostTime)
        .all(db)
        .await?;

    if races.is_empty() {
        return Ok(0);
    }

    let rows: Vec<contest_race::ActiveModel> = races
        .iter()
        .enumerate()
        .map(|(i, r)| contest_race::ActiveModel {
            contest_id: Set(contest_id),
            race_id: Set(r.id),
            race_order: Set(i as i32 + 1),
        })
        .collect();

    match contest_race::Entity::insert_many(rows)
        .on_conflict(
            sea_orm::sea_query::OnConflict::columns([
                contest_race::Column::ContestId,
                contest_race::Column::RaceId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await
    {
        Ok(_) | Err(DbErr::RecordNotInserted) => Ok(races.len()),
        Err(e) => Err(e),
    }
}

/// Close a contest and reward its podium.
///
/// The `active -> finished` transition is conditional, so only the
/// invocation that actually flips the status hands out prizes; duplicate
/// triggers find zero rows affected and skip. Winner dispatches are
/// best-effort with a fixed inter-call delay for downstream rate limits.
#[instrument(skip(db, notifier, config, contest_model), fields(contest_id = contest_model.id))]
pub async fn close_and_reward(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    config: &AppConfig,
    contest_model: &contest::Model,
) -> Result<(), AppError> {
    let closed = contest::Entity::update_many()
        .col_expr(contest::Column::Status, Expr::value(ContestStatus::Finished))
        .filter(contest::Column::Id.eq(contest_model.id))
        .filter(contest::Column::Status.eq(ContestStatus::Active))
        .exec(db)
        .await?;
    if closed.rows_affected == 0 {
        info!(contest_id = contest_model.id, "Contest already closed");
        return Ok(());
    }

    let podium = contest_entry::Entity::find()
        .filter(contest_entry::Column::ContestId.eq(contest_model.id))
        .filter(contest_entry::Column::IsEligible.eq(true))
        .order_by_desc(contest_entry::Column::TotalPoints)
        .order_by_desc(contest_entry::Column::HitRaceCount)
        .order_by_asc(contest_entry::Column::EarliestVoteAt)
        .limit(3)
        .all(db)
        .await?;

    let prizes = [
        contest_model.prize_first,
        contest_model.prize_second,
        contest_model.prize_third,
    ];
    let podium_flags = match contest_model.contest_type {
        ContestType::Weekly => badges::SettlementFlags {
            weekly_podium: true,
            ..Default::default()
        },
        ContestType::Monthly => badges::SettlementFlags {
            monthly_podium: true,
            ..Default::default()
        },
    };

    for (position, entry) in podium.iter().enumerate() {
        let prize = prizes[position];
        let rank = position + 1;

        let audit = points_transaction::ActiveModel {
            id: Set(Uuid::now_v7()),
            user_id: Set(entry.user_id),
            vote_id: Set(None),
            race_id: Set(None),
            contest_id: Set(Some(contest_model.id)),
            amount: Set(0),
            reason: Set(TransactionReason::ContestPrize),
            description: Set(format!(
                "{}: finished #{rank}, prize {prize}",
                contest_model.name
            )),
            created_at: Set(Utc::now()),
        };
        audit.insert(db).await?;

        badges::evaluate(db, notifier, entry.user_id, podium_flags).await?;

        if let Err(e) = notifier
            .notify(
                entry.user_id,
                "contest_result",
                &format!("Contest podium: #{rank}!"),
                &format!(
                    "You finished #{rank} in {} with {} points. A {prize} gift voucher is on its way.",
                    contest_model.name, entry.total_points
                ),
            )
            .await
        {
            warn!(user_id = entry.user_id, error = %e, "Winner notification failed");
        }

        let email = profile::Entity::find_by_id(entry.user_id)
            .one(db)
            .await?
            .and_then(|p| p.email);
        if let Some(email) = email {
            if let Err(e) = notifier
                .send_email(
                    &email,
                    &format!("You placed #{rank} in {}", contest_model.name),
                    &format!(
                        "Congratulations! You finished #{rank} with {} points and won a {prize} gift voucher.",
                        entry.total_points
                    ),
                )
                .await
            {
                warn!(user_id = entry.user_id, error = %e, "Winner email failed");
            }
        }

        tokio::time::sleep(std::time::Duration::from_millis(
            config.settlement.notify_delay_ms,
        ))
        .await;
    }

    info!(
        contest_id = contest_model.id,
        winners = podium.len(),
        "Contest closed and rewarded"
    );
    Ok(())
}

/// Monthly reset: snapshot final standings into the just-closed contest,
/// zero every nonzero monthly counter, write the audit ledger rows, and
/// auto-enroll recently active users into the new contest.
///
/// Every write is keyed on a natural idempotency key and chunked; a failed
/// chunk is logged and skipped while prior chunks stand, and a full re-run
/// after completion is a no-op (no profiles with nonzero monthly points
/// remain).
#[instrument(skip(db, config))]
pub async fn monthly_reset(
    db: &DatabaseConnection,
    config: &AppConfig,
    today: NaiveDate,
) -> Result<MonthlyResetResponse, AppError> {
    let batch = config.contest.batch_size.max(1);
    let prev_period = previous_monthly_key(today);
    let now = Utc::now();

    // Profiles at zero are excluded outright: no snapshot, no audit row.
    let carriers: Vec<(i32, i32)> = profile::Entity::find()
        .filter(profile::Column::MonthlyPoints.gt(0))
        .select_only()
        .column(profile::Column::Id)
        .column(profile::Column::MonthlyPoints)
        .into_tuple()
        .all(db)
        .await?;

    let mut snapshot_entries = 0usize;
    let prev_contest = find_by_period(db, ContestType::Monthly, &prev_period).await?;
    if let Some(prev) = &prev_contest {
        for chunk in carriers.chunks(batch) {
            let rows: Vec<contest_entry::ActiveModel> = chunk
                .iter()
                .map(|&(user_id, points)| contest_entry::ActiveModel {
                    contest_id: Set(prev.id),
                    user_id: Set(user_id),
                    total_points: Set(points),
                    vote_count: Set(0),
                    hit_race_count: Set(0),
                    earliest_vote_at: Set(None),
                    is_eligible: Set(false),
                    created_at: Set(now),
                    ..Default::default()
                })
                .collect();

            let result = contest_entry::Entity::insert_many(rows)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::columns([
                        contest_entry::Column::ContestId,
                        contest_entry::Column::UserId,
                    ])
                    .update_column(contest_entry::Column::TotalPoints)
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await;

            match result {
                Ok(_) | Err(DbErr::RecordNotInserted) => snapshot_entries += chunk.len(),
                Err(e) => {
                    error!(contest_id = prev.id, error = %e, "Snapshot chunk failed; continuing");
                }
            }
        }
    } else {
        warn!(%prev_period, "No contest to snapshot the closing month into");
    }

    let reset_profiles = profile::Entity::update_many()
        .col_expr(profile::Column::MonthlyPoints, Expr::value(0))
        .filter(profile::Column::MonthlyPoints.gt(0))
        .exec(db)
        .await?
        .rows_affected;

    for chunk in carriers.chunks(batch) {
        let rows: Vec<points_transaction::ActiveModel> = chunk
            .iter()
            .map(|&(user_id, points)| points_transaction::ActiveModel {
                id: Set(Uuid::now_v7()),
                user_id: Set(user_id),
                vote_id: Set(None),
                race_id: Set(None),
                contest_id: Set(prev_contest.as_ref().map(|c| c.id)),
                amount: Set(0),
                reason: Set(TransactionReason::MonthlyReset),
                description: Set(format!(
                    "Monthly points reset for {prev_period} (carried {points}P)"
                )),
                created_at: Set(now),
            })
            .collect();
        if let Err(e) = points_transaction::Entity::insert_many(rows)
            .exec_without_returning(db)
            .await
        {
            error!(error = %e, "Reset audit chunk failed; continuing");
        }
    }

    // Enroll users active in the trailing 30 days into the new contest.
    let mut enrolled = 0usize;
    let current = contest::Entity::find()
        .filter(contest::Column::ContestType.eq(ContestType::Monthly))
        .filter(contest::Column::Period.eq(period_key(ContestType::Monthly, today)))
        .filter(contest::Column::Status.eq(ContestStatus::Active))
        .one(db)
        .await?;
    if let Some(current) = current {
        let cutoff = now - Duration::days(30);
        let active_users: Vec<i32> = vote::Entity::find()
            .filter(vote::Column::CreatedAt.gte(cutoff))
            .select_only()
            .column(vote::Column::UserId)
            .distinct()
            .into_tuple()
            .all(db)
            .await?;

        for chunk in active_users.chunks(batch) {
            let rows: Vec<contest_entry::ActiveModel> = chunk
                .iter()
                .map(|&user_id| contest_entry::ActiveModel {
                    contest_id: Set(current.id),
                    user_id: Set(user_id),
                    total_points: Set(0),
                    vote_count: Set(0),
                    hit_race_count: Set(0),
                    earliest_vote_at: Set(None),
                    is_eligible: Set(false),
                    created_at: Set(now),
                    ..Default::default()
                })
                .collect();

            let result = contest_entry::Entity::insert_many(rows)
                .on_conflict(
                    sea_orm::sea_query::OnConflict::columns([
                        contest_entry::Column::ContestId,
                        contest_entry::Column::UserId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(db)
                .await;

            match result {
                Ok(_) | Err(DbErr::RecordNotInserted) => enrolled += chunk.len(),
                Err(e) => {
                    error!(contest_id = current.id, error = %e, "Enrollment chunk failed; continuing");
                }
            }
        }
    }

    info!(
        snapshot_entries,
        reset_profiles, enrolled, "Monthly reset complete"
    );
    Ok(MonthlyResetResponse {
        snapshot_entries,
        reset_profiles,
        enrolled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> AppConfig {
        use crate::config::*;
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".into(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 0,
                },
            },
            database: DatabaseConfig { url: String::new() },
            scheduler: SchedulerConfig {
                secret: "s".into(),
            },
            settlement: SettlementConfig {
                close_margin_mins: 5,
                notify_delay_ms: 0,
            },
            contest: ContestConfig {
                weekly_min_votes: 3,
                monthly_min_votes: 5,
                batch_size: 500,
            },
        }
    }

    fn contest_row(id: i32, period: &str) -> contest::Model {
        contest::Model {
            id,
            name: format!("Weekly Contest {period}"),
            contest_type: ContestType::Weekly,
            status: ContestStatus::Active,
            period: period.into(),
            min_votes: 3,
            prize_first: 5000,
            prize_second: 3000,
            prize_third: 2000,
            started_at: Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap(),
            created_at: Utc.with_ymd_and_hms(2026, 8, 3, 0, 0, 0).unwrap(),
        }
    }

    /// Duplicate creation for the same week returns the existing contest id
    /// without touching the database again.
    #[tokio::test]
    async fn ensure_contest_returns_existing_id_for_the_same_period() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![contest_row(42, "2026-08-03")]])
            .into_connection();

        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
        let outcome = ensure_contest(
            &db,
            &crate::notify::LogDispatcher,
            &config(),
            ContestType::Weekly,
            today,
        )
        .await
        .unwrap();

        assert_eq!(outcome.contest_id, 42);
        assert!(!outcome.created);
        assert_eq!(outcome.period, "2026-08-03");

        // Exactly one SELECT was issued: the period-key lookup.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
    }

    /// A closed contest is never rewarded twice: the second close sees the
    /// conditional transition affect zero rows and stops.
    #[tokio::test]
    async fn close_and_reward_skips_an_already_closed_contest() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let mut closed = contest_row(7, "2026-08-03");
        closed.status = ContestStatus::Active; // caller's stale view
        close_and_reward(&db, &crate::notify::LogDispatcher, &config(), &closed)
            .await
            .unwrap();

        // Only the conditional UPDATE ran; no podium query, no prizes.
        let log = db.into_transaction_log();
        assert_eq!(log.len(), 1);
    }
}
