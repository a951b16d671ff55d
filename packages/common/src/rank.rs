use serde::{Deserialize, Serialize};

/// Broad band a rank belongs to, used by badge predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankTier {
    Beginner,
    Forecaster,
    Advanced,
    Master,
    Legend,
}

/// One row of the rank table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rank {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: RankTier,
    /// Minimum cumulative points for this rank. Strictly increasing down
    /// the table.
    pub threshold: i32,
}

/// Rank ladder keyed by lifetime points. Because cumulative points never
/// decrease, assigned ranks are non-decreasing and no downgrade path exists.
pub const RANKS: &[Rank] = &[
    Rank { id: "beginner_1", name: "Beginner I", tier: RankTier::Beginner, threshold: 0 },
    Rank { id: "beginner_2", name: "Beginner II", tier: RankTier::Beginner, threshold: 30 },
    Rank { id: "beginner_3", name: "Beginner III", tier: RankTier::Beginner, threshold: 80 },
    Rank { id: "beginner_4", name: "Beginner IV", tier: RankTier::Beginner, threshold: 200 },
    Rank { id: "beginner_5", name: "Beginner V", tier: RankTier::Beginner, threshold: 400 },
    Rank { id: "forecaster_1", name: "Forecaster I", tier: RankTier::Forecaster, threshold: 700 },
    Rank { id: "forecaster_2", name: "Forecaster II", tier: RankTier::Forecaster, threshold: 1100 },
    Rank { id: "forecaster_3", name: "Forecaster III", tier: RankTier::Forecaster, threshold: 1600 },
    Rank { id: "forecaster_4", name: "Forecaster IV", tier: RankTier::Forecaster, threshold: 2200 },
    Rank { id: "forecaster_5", name: "Forecaster V", tier: RankTier::Forecaster, threshold: 3000 },
    Rank { id: "advanced_1", name: "Advanced I", tier: RankTier::Advanced, threshold: 4000 },
    Rank { id: "advanced_2", name: "Advanced II", tier: RankTier::Advanced, threshold: 5500 },
    Rank { id: "advanced_3", name: "Advanced III", tier: RankTier::Advanced, threshold: 7500 },
    Rank { id: "advanced_4", name: "Advanced IV", tier: RankTier::Advanced, threshold: 10000 },
    Rank { id: "advanced_5", name: "Advanced V", tier: RankTier::Advanced, threshold: 13000 },
    Rank { id: "master_1", name: "Master I", tier: RankTier::Master, threshold: 16500 },
    Rank { id: "master_2", name: "Master II", tier: RankTier::Master, threshold: 20500 },
    Rank { id: "master_3", name: "Master III", tier: RankTier::Master, threshold: 25000 },
    Rank { id: "master_4", name: "Master IV", tier: RankTier::Master, threshold: 30000 },
    Rank { id: "master_5", name: "Master V", tier: RankTier::Master, threshold: 36000 },
    Rank { id: "legend", name: "Legend", tier: RankTier::Legend, threshold: 45000 },
];

/// Highest rank whose threshold does not exceed the given points.
pub fn rank_for_points(points: i32) -> &'static Rank {
    RANKS
        .iter()
        .rev()
        .find(|r| points >= r.threshold)
        .unwrap_or(&RANKS[0])
}

/// Look up a rank by id. Unknown ids resolve to the bottom rank.
pub fn rank_by_id(id: &str) -> &'static Rank {
    RANKS.iter().find(|r| r.id == id).unwrap_or(&RANKS[0])
}

/// Position of a rank id in the ladder; unknown ids rank lowest.
pub fn rank_index(id: &str) -> usize {
    RANKS.iter().position(|r| r.id == id).unwrap_or(0)
}

/// Next rank above the given one, or `None` at the top.
pub fn next_rank(id: &str) -> Option<&'static Rank> {
    RANKS.get(rank_index(id) + 1)
}
