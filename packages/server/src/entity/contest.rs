use common::{ContestStatus, ContestType};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A time-boxed competition. `(contest_type, period)` is the natural
/// idempotency key: re-running a scheduled create for the same period finds
/// the existing row instead of inserting a duplicate.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub contest_type: ContestType,
    pub status: ContestStatus,
    /// Week-start ISO date for weekly contests, `YYYY-MM` for monthly.
    pub period: String,
    /// Minimum settled votes for an entry to be ranked and prized.
    pub min_votes: i32,

    pub prize_first: i32,
    pub prize_second: i32,
    pub prize_third: i32,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::contest_entry::Entity>,

    #[sea_orm(has_many, via = "contest_race")]
    pub races: HasMany<super::race::Entity>,

    pub started_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
