use std::collections::HashSet;

use crate::rank::{RankTier, rank_by_id};

/// Aggregate state a badge predicate is evaluated against.
///
/// Counter fields are cumulative and never decrease, so predicates are
/// monotonic and evaluation order does not matter. The boolean flags are
/// one-shot conditions describing the event that triggered this evaluation.
#[derive(Debug, Clone, Default)]
pub struct AggregateSnapshot {
    pub total_votes: i32,
    pub win_hits: i32,
    pub perfect_votes: i32,
    pub best_streak: i32,
    pub rank_id: String,
    /// A win pick on a long shot (popularity 10+) just hit.
    pub upset_hit: bool,
    /// A win pick just hit in a top-grade (G1) race.
    pub top_grade_win: bool,
    /// The user just finished on a weekly contest podium.
    pub weekly_podium: bool,
    /// The user just finished on a monthly contest podium.
    pub monthly_podium: bool,
}

/// Declarative predicate over an [`AggregateSnapshot`].
///
/// Adding a badge means adding a catalog row, never touching control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeRule {
    TotalVotes(i32),
    WinHits(i32),
    PerfectVotes(i32),
    BestStreak(i32),
    RankReached(RankTier),
    UpsetHit,
    TopGradeWin,
    WeeklyPodium,
    MonthlyPodium,
}

impl BadgeRule {
    pub fn satisfied(&self, s: &AggregateSnapshot) -> bool {
        match *self {
            Self::TotalVotes(n) => s.total_votes >= n,
            Self::WinHits(n) => s.win_hits >= n,
            Self::PerfectVotes(n) => s.perfect_votes >= n,
            Self::BestStreak(n) => s.best_streak >= n,
            Self::RankReached(tier) => rank_by_id(&s.rank_id).tier >= tier,
            Self::UpsetHit => s.upset_hit,
            Self::TopGradeWin => s.top_grade_win,
            Self::WeeklyPodium => s.weekly_podium,
            Self::MonthlyPodium => s.monthly_podium,
        }
    }
}

/// One badge in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
    pub rule: BadgeRule,
}

pub const CATALOG: &[BadgeSpec] = &[
    BadgeSpec { id: "first_vote", name: "First Vote", icon: "🎫", description: "Submitted your first prediction", rule: BadgeRule::TotalVotes(1) },
    BadgeSpec { id: "vote_10", name: "Regular", icon: "🎫", description: "Submitted 10 predictions", rule: BadgeRule::TotalVotes(10) },
    BadgeSpec { id: "vote_50", name: "Devotee", icon: "🎫", description: "Submitted 50 predictions", rule: BadgeRule::TotalVotes(50) },
    BadgeSpec { id: "vote_100", name: "Centurion", icon: "🎫", description: "Submitted 100 predictions", rule: BadgeRule::TotalVotes(100) },
    BadgeSpec { id: "first_win", name: "First Win", icon: "🎯", description: "Hit your first winner", rule: BadgeRule::WinHits(1) },
    BadgeSpec { id: "win_10", name: "Sharp Eye", icon: "🎯", description: "Hit 10 winners", rule: BadgeRule::WinHits(10) },
    BadgeSpec { id: "win_50", name: "Oracle", icon: "🎯", description: "Hit 50 winners", rule: BadgeRule::WinHits(50) },
    BadgeSpec { id: "perfect_1", name: "Perfect Card", icon: "💯", description: "Every pick in one vote hit", rule: BadgeRule::PerfectVotes(1) },
    BadgeSpec { id: "perfect_5", name: "Perfectionist", icon: "💯", description: "Five perfect votes", rule: BadgeRule::PerfectVotes(5) },
    BadgeSpec { id: "streak_3", name: "Hot Streak", icon: "🔥", description: "Three hits in a row", rule: BadgeRule::BestStreak(3) },
    BadgeSpec { id: "streak_5", name: "On Fire", icon: "🔥", description: "Five hits in a row", rule: BadgeRule::BestStreak(5) },
    BadgeSpec { id: "streak_10", name: "Unstoppable", icon: "🔥", description: "Ten hits in a row", rule: BadgeRule::BestStreak(10) },
    BadgeSpec { id: "rank_forecaster", name: "Forecaster", icon: "⭐", description: "Reached the Forecaster tier", rule: BadgeRule::RankReached(RankTier::Forecaster) },
    BadgeSpec { id: "rank_advanced", name: "Advanced Forecaster", icon: "⭐", description: "Reached the Advanced tier", rule: BadgeRule::RankReached(RankTier::Advanced) },
    BadgeSpec { id: "rank_master", name: "Master Forecaster", icon: "👑", description: "Reached the Master tier", rule: BadgeRule::RankReached(RankTier::Master) },
    BadgeSpec { id: "rank_legend", name: "Legend", icon: "🏆", description: "Reached the Legend rank", rule: BadgeRule::RankReached(RankTier::Legend) },
    BadgeSpec { id: "big_upset", name: "Giant Killer", icon: "⚡", description: "Hit a winner at popularity 10 or lower", rule: BadgeRule::UpsetHit },
    BadgeSpec { id: "g1_winner", name: "G1 Conqueror", icon: "🏅", description: "Hit the winner of a G1 race", rule: BadgeRule::TopGradeWin },
    BadgeSpec { id: "weekly_top3", name: "Weekly Podium", icon: "🥉", description: "Finished top 3 in a weekly contest", rule: BadgeRule::WeeklyPodium },
    BadgeSpec { id: "monthly_top3", name: "Monthly Podium", icon: "🥇", description: "Finished top 3 in a monthly contest", rule: BadgeRule::MonthlyPodium },
];

/// Look up a catalog entry by id.
pub fn badge_by_id(id: &str) -> Option<&'static BadgeSpec> {
    CATALOG.iter().find(|b| b.id == id)
}

/// Scan the catalog and return every badge newly satisfied by the snapshot.
///
/// Already-owned badges are skipped, so a grant can never be duplicated no
/// matter how often evaluation runs.
pub fn newly_satisfied(
    snapshot: &AggregateSnapshot,
    owned: &HashSet<String>,
) -> Vec<&'static BadgeSpec> {
    CATALOG
        .iter()
        .filter(|b| !owned.contains(b.id) && b.rule.satisfied(snapshot))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> AggregateSnapshot {
        AggregateSnapshot {
            rank_id: "beginner_1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn catalog_ids_are_unique() {
        let mut seen = HashSet::new();
        for badge in CATALOG {
            assert!(seen.insert(badge.id), "duplicate badge id {}", badge.id);
        }
    }

    #[test]
    fn milestones_trigger_at_thresholds() {
        let mut s = snapshot();
        s.total_votes = 9;
        let ids: Vec<_> = newly_satisfied(&s, &HashSet::new())
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"first_vote"));
        assert!(!ids.contains(&"vote_10"));

        s.total_votes = 10;
        let ids: Vec<_> = newly_satisfied(&s, &HashSet::new())
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"vote_10"));
    }

    #[test]
    fn owned_badges_are_never_granted_again() {
        let mut s = snapshot();
        s.total_votes = 100;
        let owned: HashSet<String> = ["first_vote", "vote_10", "vote_50", "vote_100"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let fresh = newly_satisfied(&s, &owned);
        assert!(fresh.iter().all(|b| !owned.contains(b.id)));
        assert!(!fresh.iter().any(|b| b.id.starts_with("vote")));
    }

    #[test]
    fn rank_tier_predicates_include_higher_tiers() {
        let mut s = snapshot();
        s.rank_id = "master_2".into();
        let ids: Vec<_> = newly_satisfied(&s, &HashSet::new())
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"rank_forecaster"));
        assert!(ids.contains(&"rank_advanced"));
        assert!(ids.contains(&"rank_master"));
        assert!(!ids.contains(&"rank_legend"));
    }

    #[test]
    fn one_shot_flags_only_fire_when_set() {
        let mut s = snapshot();
        assert!(newly_satisfied(&s, &HashSet::new())
            .iter()
            .all(|b| b.id != "big_upset" && b.id != "g1_winner"));

        s.upset_hit = true;
        s.top_grade_win = true;
        let ids: Vec<_> = newly_satisfied(&s, &HashSet::new())
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"big_upset"));
        assert!(ids.contains(&"g1_winner"));
    }

    #[test]
    fn podium_flags_map_to_contest_badges() {
        let mut s = snapshot();
        s.weekly_podium = true;
        let ids: Vec<_> = newly_satisfied(&s, &HashSet::new())
            .iter()
            .map(|b| b.id)
            .collect();
        assert!(ids.contains(&"weekly_top3"));
        assert!(!ids.contains(&"monthly_top3"));
    }

    #[test]
    fn badge_by_id_resolves_catalog_entries() {
        assert_eq!(badge_by_id("first_vote").unwrap().name, "First Vote");
        assert!(badge_by_id("unknown").is_none());
    }
}
