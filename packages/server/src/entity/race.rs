use common::RaceStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub race_date: Date,
    /// Scheduled start; picks close a configurable margin before this.
    pub post_time: DateTimeUtc,
    pub venue: Option<String>,
    /// Grade code (G1/G2/G3/L/OP); ungraded races carry NULL.
    pub grade: Option<String>,
    pub status: RaceStatus,

    #[sea_orm(has_many)]
    pub entries: HasMany<super::race_entry::Entity>,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    #[sea_orm(has_many)]
    pub results: HasMany<super::race_result::Entity>,

    #[sea_orm(has_many, via = "contest_race")]
    pub contests: HasMany<super::contest::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
