use common::badge::CATALOG;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{badge, contest, contest_entry, points_transaction, vote};

/// Seed the badge catalog table from the static catalog.
pub async fn seed_badge_catalog(db: &DatabaseConnection) -> Result<(), DbErr> {
    let mut inserted = 0u32;
    for spec in CATALOG {
        let model = badge::ActiveModel {
            id: Set(spec.id.to_string()),
            name: Set(spec.name.to_string()),
            icon: Set(spec.icon.to_string()),
            description: Set(spec.description.to_string()),
        };

        let result = badge::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(badge::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if inserted > 0 {
        info!("Seeded {} new badges", inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes, so the natural
/// idempotency keys are created manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One vote per (race, user); the settlement idempotency gate relies on
    // unique vote rows.
    let unique_vote = Index::create()
        .if_not_exists()
        .name("idx_vote_race_user")
        .table(vote::Entity)
        .col(vote::Column::RaceId)
        .col(vote::Column::UserId)
        .unique()
        .to_string(PostgresQueryBuilder);

    // One contest per (type, period); duplicate scheduled triggers conflict
    // here instead of creating a second contest.
    let unique_contest = Index::create()
        .if_not_exists()
        .name("idx_contest_type_period")
        .table(contest::Entity)
        .col(contest::Column::ContestType)
        .col(contest::Column::Period)
        .unique()
        .to_string(PostgresQueryBuilder);

    // One entry per (contest, user); reset snapshots and enrollment upsert
    // against this key.
    let unique_entry = Index::create()
        .if_not_exists()
        .name("idx_contest_entry_contest_user")
        .table(contest_entry::Entity)
        .col(contest_entry::Column::ContestId)
        .col(contest_entry::Column::UserId)
        .unique()
        .to_string(PostgresQueryBuilder);

    // Ledger reporting: SELECT ... WHERE user_id = ? ORDER BY created_at
    let ledger_by_user = Index::create()
        .if_not_exists()
        .name("idx_points_transaction_user_created")
        .table(points_transaction::Entity)
        .col(points_transaction::Column::UserId)
        .col(points_transaction::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    // Trailing-activity queries: votes in the last 30 days.
    let vote_by_created = Index::create()
        .if_not_exists()
        .name("idx_vote_created")
        .table(vote::Entity)
        .col(vote::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    for (name, stmt) in [
        ("idx_vote_race_user", unique_vote),
        ("idx_contest_type_period", unique_contest),
        ("idx_contest_entry_contest_user", unique_entry),
        ("idx_points_transaction_user_created", ledger_by_user),
        ("idx_vote_created", vote_by_created),
    ] {
        match db.execute_unprepared(&stmt).await {
            Ok(_) => info!("Ensured index {name} exists"),
            Err(e) => tracing::warn!("Failed to create index {name}: {e}"),
        }
    }

    Ok(())
}
