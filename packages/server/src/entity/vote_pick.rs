use common::PickType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote_pick")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub vote_id: i32,
    #[sea_orm(belongs_to, from = "vote_id", to = "id")]
    pub vote: HasOne<super::vote::Entity>,

    pub race_entry_id: i32,
    #[sea_orm(belongs_to, from = "race_entry_id", to = "id")]
    pub entry: HasOne<super::race_entry::Entity>,

    pub pick_type: PickType,
    /// NULL until settled; stays NULL for picks excluded from scoring
    /// (scratched entry or no matched result).
    pub is_hit: Option<bool>,
    pub points_earned: i32,
}

impl ActiveModelBehavior for ActiveModel {}
