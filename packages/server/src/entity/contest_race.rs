use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Qualifying race linked to a weekly contest.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest_race")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub contest_id: i32,
    #[sea_orm(primary_key)]
    pub race_id: i32,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: Option<super::contest::Entity>,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: Option<super::race::Entity>,

    pub race_order: i32,
}

impl ActiveModelBehavior for ActiveModel {}
