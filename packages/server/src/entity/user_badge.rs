use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only badge grant, unique per (user, badge). Never revoked.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_badge")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub user_id: i32,
    #[sea_orm(primary_key)]
    pub badge_id: String,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub profile: Option<super::profile::Entity>,
    #[sea_orm(belongs_to, from = "badge_id", to = "id")]
    pub badge: Option<super::badge::Entity>,

    pub earned_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
