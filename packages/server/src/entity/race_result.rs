use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Finishing result for one race entry, written by the external result feed.
/// Entries without a row here are not yet settleable.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "race_result")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub race_id: i32,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: HasOne<super::race::Entity>,

    #[sea_orm(unique)]
    pub race_entry_id: i32,
    #[sea_orm(belongs_to, from = "race_entry_id", to = "id")]
    pub entry: HasOne<super::race_entry::Entity>,

    pub finish_position: i32,
    pub margin: Option<String>,
    pub finish_time: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
