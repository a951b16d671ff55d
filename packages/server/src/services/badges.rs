use std::collections::HashSet;

use chrono::Utc;
use common::badge::{AggregateSnapshot, BadgeSpec, newly_satisfied};
use sea_orm::*;
use tracing::{info, warn};

use crate::entity::{profile, user_badge, vote};
use crate::notify::NotificationDispatcher;

/// One-shot conditions from the event that triggered this evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementFlags {
    pub upset_hit: bool,
    pub top_grade_win: bool,
    pub weekly_podium: bool,
    pub monthly_podium: bool,
}

/// Evaluate the badge catalog against the user's current aggregates and
/// grant every newly satisfied badge exactly once.
///
/// The grant is an insert keyed on (user_id, badge_id) with conflicts
/// ignored, so repeated evaluation never duplicates a badge. One
/// notification is emitted per new grant, best-effort.
pub async fn evaluate(
    db: &DatabaseConnection,
    notifier: &dyn NotificationDispatcher,
    user_id: i32,
    flags: SettlementFlags,
) -> Result<Vec<&'static BadgeSpec>, DbErr> {
    let Some(profile_model) = profile::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(Vec::new());
    };

    let perfect_votes = vote::Entity::find()
        .filter(vote::Column::UserId.eq(user_id))
        .filter(vote::Column::IsPerfect.eq(true))
        .count(db)
        .await? as i32;

    let owned: HashSet<String> = user_badge::Entity::find()
        .filter(user_badge::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|b| b.badge_id)
        .collect();

    let snapshot = AggregateSnapshot {
        total_votes: profile_model.total_votes,
        win_hits: profile_model.win_hits,
        perfect_votes,
        best_streak: profile_model.best_streak,
        rank_id: profile_model.rank_id,
        upset_hit: flags.upset_hit,
        top_grade_win: flags.top_grade_win,
        weekly_podium: flags.weekly_podium,
        monthly_podium: flags.monthly_podium,
    };

    let fresh = newly_satisfied(&snapshot, &owned);
    for spec in &fresh {
        let grant = user_badge::ActiveModel {
            user_id: Set(user_id),
            badge_id: Set(spec.id.to_string()),
            earned_at: Set(Utc::now()),
        };
        let inserted = user_badge::Entity::insert(grant)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    user_badge::Column::UserId,
                    user_badge::Column::BadgeId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match inserted {
            Ok(_) => {
                info!(user_id, badge_id = spec.id, "Granted badge");
                if let Err(e) = notifier
                    .notify(
                        user_id,
                        "badge",
                        "Badge earned!",
                        &format!("{} {} unlocked: {}", spec.icon, spec.name, spec.description),
                    )
                    .await
                {
                    warn!(user_id, badge_id = spec.id, error = %e, "Badge notification failed");
                }
            }
            // Another evaluation won the race for this grant.
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    Ok(fresh)
}
