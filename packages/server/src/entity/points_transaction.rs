use common::TransactionReason;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only points ledger. Source of truth for historical reporting,
/// independent of the mutable profile aggregates. Amounts may be zero for
/// audit rows (monthly resets, prize records).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "points_transaction")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub user_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id")]
    pub profile: HasOne<super::profile::Entity>,

    pub vote_id: Option<i32>,
    #[sea_orm(belongs_to, from = "vote_id", to = "id")]
    pub vote: Option<super::vote::Entity>,

    pub race_id: Option<i32>,
    #[sea_orm(belongs_to, from = "race_id", to = "id")]
    pub race: Option<super::race::Entity>,

    pub contest_id: Option<i32>,
    #[sea_orm(belongs_to, from = "contest_id", to = "id")]
    pub contest: Option<super::contest::Entity>,

    pub amount: i32,
    pub reason: TransactionReason,
    pub description: String,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
