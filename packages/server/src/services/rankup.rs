use common::rank::{Rank, rank_for_points, rank_index};
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::profile;
use crate::notify::NotificationDispatcher;

/// Re-derive the user's rank from lifetime points and apply it when it
/// moved up. Cumulative points never decrease, so the assigner only checks
/// forward; there is no downgrade path.
pub async fn check_rank_up(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    user_id: i32,
) -> Result<Option<&'static Rank>, DbErr> {
    let Some(profile_model) = profile::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    let new_rank = rank_for_points(profile_model.cumulative_points);
    if rank_index(new_rank.id) <= rank_index(&profile_model.rank_id) {
        return Ok(None);
    }

    // Conditional on the rank we read, so concurrent settlements for the
    // same user apply exactly one upgrade per step.
    let updated = profile::Entity::update_many()
        .col_expr(profile::Column::RankId, Expr::value(new_rank.id))
        .filter(profile::Column::Id.eq(user_id))
        .filter(profile::Column::RankId.eq(profile_model.rank_id.clone()))
        .exec(db)
        .await?;
    if updated.rows_affected == 0 {
        return Ok(None);
    }

    info!(user_id, rank_id = new_rank.id, "Rank up");
    if let Err(e) = notifier
        .notify(
            user_id,
            "rank_up",
            "Rank up!",
            &format!("You reached {}", new_rank.name),
        )
        .await
    {
        warn!(user_id, error = %e, "Rank-up notification failed");
    }

    Ok(Some(new_rank))
}
