use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user standing within a contest, unique per (contest_id, user_id).
/// Rows of a finished contest are immutable snapshots.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub contest_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: HasOne<super::contest::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    pub total_points: i32,
    pub vote_count: i32,
    /// Races in which at least one pick hit; first tie-break key.
    pub hit_race_count: i32,
    /// Submission time of the user's first counted vote; second tie-break key.
    pub earliest_vote_at: Option<DateTimeUtc>,
    pub is_eligible: bool,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
