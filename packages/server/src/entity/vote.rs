use common::VoteStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One user's submission for one race. Unique per (race_id, user_id);
/// the terminal status is write-once, enforced by a conditional update
/// during settlement.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub race_id: i32,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: HasOne<super::race::Entity>,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    pub status: VoteStatus,
    pub earned_points: i32,
    pub is_perfect: bool,
    /// Engagement counter maintained by the external social layer;
    /// read-only inside this engine.
    pub like_count: i32,

    #[sea_orm(has_many)]
    pub picks: HasMany<super::vote_pick::Entity>,

    pub created_at: DateTimeUtc,
    pub settled_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
