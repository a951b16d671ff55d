use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_entry")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub race_id: i32,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: HasOne<super::race::Entity>,

    pub post_number: i32,
    pub horse_name: String,
    /// Popularity at vote close; drives win-payout tiers. NULL until the
    /// backfill runs.
    pub popularity: Option<i32>,
    pub is_scratched: bool,

    #[sea_orm(has_one)]
    pub result: HasOne<super::race_result::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
