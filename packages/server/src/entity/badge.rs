use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Badge catalog row, seeded on startup from the static catalog.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub name: String,
    pub icon: String,
    pub description: String,

    #[sea_orm(has_many, via = "user_badge")]
    pub owners: HasMany<super::profile::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
