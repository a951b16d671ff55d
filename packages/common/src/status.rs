#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error when parsing an invalid enum string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value '{invalid}' for {kind}. Valid values: {valid}")]
pub struct ParseEnumError {
    kind: &'static str,
    invalid: String,
    valid: &'static str,
}

/// Lifecycle of a race, driving pick acceptance and settlement eligibility.
///
/// Transitions are monotonic: `Upcoming -> VotingOpen -> VotingClosed -> Finished`.
/// When the `sea-orm` feature is enabled, this enum can be used directly in
/// SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum RaceStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "upcoming"))]
    Upcoming,
    /// Picks are accepted.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "voting_open"))]
    VotingOpen,
    /// Post time reached; picks frozen, results not yet settled.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "voting_closed"))]
    VotingClosed,
    /// Results recorded and votes settled.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "finished"))]
    Finished,
}

impl RaceStatus {
    fn order(self) -> u8 {
        match self {
            Self::Upcoming => 0,
            Self::VotingOpen => 1,
            Self::VotingClosed => 2,
            Self::Finished => 3,
        }
    }

    /// Returns true if `next` is a legal (forward-only) transition target.
    pub fn can_transition(self, next: RaceStatus) -> bool {
        next.order() > self.order()
    }

    /// Returns true if votes for this race may be settled.
    pub fn is_settleable(self) -> bool {
        matches!(self, Self::VotingClosed | Self::Finished)
    }

    pub const ALL: &'static [RaceStatus] = &[
        Self::Upcoming,
        Self::VotingOpen,
        Self::VotingClosed,
        Self::Finished,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::VotingOpen => "voting_open",
            Self::VotingClosed => "voting_closed",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for RaceStatus {
    fn default() -> Self {
        Self::Upcoming
    }
}

impl FromStr for RaceStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(Self::Upcoming),
            "voting_open" => Ok(Self::VotingOpen),
            "voting_closed" => Ok(Self::VotingClosed),
            "finished" => Ok(Self::Finished),
            _ => Err(ParseEnumError {
                kind: "RaceStatus",
                invalid: s.to_string(),
                valid: "upcoming, voting_open, voting_closed, finished",
            }),
        }
    }
}

/// Settlement state of one user's vote on one race.
///
/// `Pending` is the only non-terminal state; the transition into a terminal
/// state happens exactly once, via a conditional update keyed on `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending"))]
    Pending,
    /// At least one pick hit.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "settled_hit"))]
    SettledHit,
    /// No pick hit.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "settled_miss"))]
    SettledMiss,
}

impl VoteStatus {
    /// Returns true once the vote has been settled; terminal states never change.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Legal transitions: `Pending -> SettledHit | SettledMiss` only.
    pub fn can_transition(self, next: VoteStatus) -> bool {
        self == Self::Pending && next.is_terminal()
    }

    /// Terminal state for a settled vote.
    pub fn settled(any_hit: bool) -> Self {
        if any_hit {
            Self::SettledHit
        } else {
            Self::SettledMiss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SettledHit => "settled_hit",
            Self::SettledMiss => "settled_miss",
        }
    }
}

impl fmt::Display for VoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for VoteStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// One selection within a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum PickType {
    /// The predicted winner. Exactly one per vote.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "win"))]
    Win,
    /// Expected to finish in the placings.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "place"))]
    Place,
    /// Cover pick; pays on a placing like `place` but kept as a distinct
    /// strategy in the product.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "back"))]
    Back,
    /// A favorite predicted to finish out of the placings.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "danger"))]
    Danger,
}

impl PickType {
    /// Inclusive (min, max) number of picks of this type per vote.
    pub fn cardinality(self) -> (usize, usize) {
        match self {
            Self::Win => (1, 1),
            Self::Place => (0, 2),
            Self::Back => (0, 5),
            Self::Danger => (0, 1),
        }
    }

    pub const ALL: &'static [PickType] = &[Self::Win, Self::Place, Self::Back, Self::Danger];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Win => "win",
            Self::Place => "place",
            Self::Back => "back",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for PickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contest cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ContestType {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "weekly"))]
    Weekly,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "monthly"))]
    Monthly,
}

impl ContestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl fmt::Display for ContestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContestType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(ParseEnumError {
                kind: "ContestType",
                invalid: s.to_string(),
                valid: "weekly, monthly",
            }),
        }
    }
}

/// Contest lifecycle. `Active -> Finished`, never back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "active"))]
    Active,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "finished"))]
    Finished,
}

impl ContestStatus {
    pub fn can_transition(self, next: ContestStatus) -> bool {
        self == Self::Active && next == Self::Finished
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Finished => "finished",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn race_status_transitions_are_forward_only() {
        assert!(RaceStatus::Upcoming.can_transition(RaceStatus::VotingOpen));
        assert!(RaceStatus::VotingOpen.can_transition(RaceStatus::Finished));
        assert!(!RaceStatus::Finished.can_transition(RaceStatus::VotingOpen));
        assert!(!RaceStatus::VotingClosed.can_transition(RaceStatus::VotingClosed));
    }

    #[test]
    fn only_closed_or_finished_races_are_settleable() {
        assert!(!RaceStatus::Upcoming.is_settleable());
        assert!(!RaceStatus::VotingOpen.is_settleable());
        assert!(RaceStatus::VotingClosed.is_settleable());
        assert!(RaceStatus::Finished.is_settleable());
    }

    #[test]
    fn vote_status_terminal_is_write_once() {
        assert!(VoteStatus::Pending.can_transition(VoteStatus::SettledHit));
        assert!(VoteStatus::Pending.can_transition(VoteStatus::SettledMiss));
        assert!(!VoteStatus::SettledHit.can_transition(VoteStatus::SettledMiss));
        assert!(!VoteStatus::SettledMiss.can_transition(VoteStatus::Pending));
    }

    #[test]
    fn settled_maps_any_hit_to_terminal_state() {
        assert_eq!(VoteStatus::settled(true), VoteStatus::SettledHit);
        assert_eq!(VoteStatus::settled(false), VoteStatus::SettledMiss);
    }

    #[test]
    fn pick_cardinality_matches_rules() {
        assert_eq!(PickType::Win.cardinality(), (1, 1));
        assert_eq!(PickType::Place.cardinality(), (0, 2));
        assert_eq!(PickType::Back.cardinality(), (0, 5));
        assert_eq!(PickType::Danger.cardinality(), (0, 1));
    }

    #[test]
    fn serde_roundtrip_uses_snake_case() {
        let json = serde_json::to_string(&VoteStatus::SettledHit).unwrap();
        assert_eq!(json, "\"settled_hit\"");
        let parsed: VoteStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, VoteStatus::SettledHit);
    }

    #[test]
    fn race_status_from_str() {
        assert_eq!(
            "voting_open".parse::<RaceStatus>().unwrap(),
            RaceStatus::VotingOpen
        );
        assert!("open".parse::<RaceStatus>().is_err());
    }

    #[test]
    fn contest_status_never_reopens() {
        assert!(ContestStatus::Active.can_transition(ContestStatus::Finished));
        assert!(!ContestStatus::Finished.can_transition(ContestStatus::Active));
    }
}
