#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reason attached to every points-ledger entry.
///
/// The ledger is append-only and the source of truth for historical
/// reporting; amounts may be zero for audit rows (monthly resets, prize
/// records).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TransactionReason {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "win_hit"))]
    WinHit,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "place_hit"))]
    PlaceHit,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "back_hit"))]
    BackHit,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "danger_hit"))]
    DangerHit,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "perfect_bonus"))]
    PerfectBonus,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "streak_bonus"))]
    StreakBonus,
    /// Zero-amount audit row written when monthly points are zeroed.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "monthly_reset"))]
    MonthlyReset,
    /// Zero-amount audit row recording a contest prize award.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "contest_prize"))]
    ContestPrize,
}

impl TransactionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WinHit => "win_hit",
            Self::PlaceHit => "place_hit",
            Self::BackHit => "back_hit",
            Self::DangerHit => "danger_hit",
            Self::PerfectBonus => "perfect_bonus",
            Self::StreakBonus => "streak_bonus",
            Self::MonthlyReset => "monthly_reset",
            Self::ContestPrize => "contest_prize",
        }
    }
}

impl fmt::Display for TransactionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&TransactionReason::PerfectBonus).unwrap();
        assert_eq!(json, "\"perfect_bonus\"");
    }

    #[test]
    fn display_matches_wire_format() {
        assert_eq!(TransactionReason::MonthlyReset.to_string(), "monthly_reset");
    }
}
