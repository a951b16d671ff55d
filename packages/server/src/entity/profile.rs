use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Per-user mutable aggregates. The id is the external account id issued by
/// the identity provider; this engine never creates accounts.
///
/// `cumulative_points` is monotonic non-decreasing; `monthly_points` resets
/// to zero at month boundaries and otherwise only increases. All increments
/// go through conditional column-expression updates, never read-modify-write.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,

    pub display_name: String,
    /// Delivery address for contest-winner mail; NULL when the user has
    /// no verified address.
    pub email: Option<String>,

    pub cumulative_points: i32,
    pub monthly_points: i32,
    pub current_streak: i32,
    pub best_streak: i32,
    pub rank_id: String,
    pub total_votes: i32,
    pub win_hits: i32,
    pub place_hits: i32,
    pub danger_hits: i32,

    #[sea_orm(has_many)]
    pub votes: HasMany<super::vote::Entity>,

    #[sea_orm(has_many)]
    pub transactions: HasMany<super::points_transaction::Entity>,

    #[sea_orm(has_many, via = "user_badge")]
    pub badges: HasMany<super::badge::Entity>,

    #[sea_orm(has_many)]
    pub contest_entries: HasMany<super::contest_entry::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
