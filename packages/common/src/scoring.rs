use crate::status::PickType;

/// Win payout step table keyed by popularity at vote close.
/// Lower popularity number = more favored = smaller payout.
const WIN_POINTS_BY_POPULARITY: &[(i32, i32)] = &[
    (1, 30),
    (2, 50),
    (3, 50),
    (4, 80),
    (5, 80),
    (6, 120),
    (7, 120),
    (8, 200),
    (9, 200),
];

/// Ceiling tier: long shots beyond the table, and entries with unknown
/// popularity, pay the maximum.
pub const WIN_POINTS_CEILING: i32 = 300;

/// Flat payout for a `place` hit.
pub const PLACE_POINTS: i32 = 20;
/// Flat payout for a `back` hit. Same tier as `place` in this design;
/// the types stay separate for the product's strategy distinction.
pub const BACK_POINTS: i32 = 20;
/// Flat payout for a `danger` hit (the named favorite misses the placings).
pub const DANGER_POINTS: i32 = 30;

/// One-time bonus when every submitted pick hits.
pub const PERFECT_BONUS: i32 = 200;

/// Finishing positions that count as a placing.
pub const PLACING_POSITIONS: i32 = 3;

/// Per-hit bonus by race grade.
const GRADE_BONUS: &[(&str, i32)] = &[("G1", 30), ("G2", 15), ("G3", 10), ("L", 5), ("OP", 5)];

/// Popularity at or above which a winning pick counts as a long-shot upset.
pub const UPSET_POPULARITY: i32 = 10;

/// Outcome of scoring a single pick against its entry's finishing position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickScore {
    pub hit: bool,
    /// Base points, before any grade bonus. Zero on a miss.
    pub points: i32,
}

impl PickScore {
    const MISS: PickScore = PickScore {
        hit: false,
        points: 0,
    };
}

/// Win payout for an entry with the given popularity at vote close.
pub fn win_points(popularity: Option<i32>) -> i32 {
    let Some(popularity) = popularity else {
        return WIN_POINTS_CEILING;
    };
    WIN_POINTS_BY_POPULARITY
        .iter()
        .find(|(pop, _)| *pop == popularity)
        .map(|(_, points)| *points)
        .unwrap_or(WIN_POINTS_CEILING)
}

/// Returns true if the position counts as a placing (top 3).
pub fn is_placing(finish_position: i32) -> bool {
    (1..=PLACING_POSITIONS).contains(&finish_position)
}

/// Score one pick. Pure: (pick type, finishing position, popularity) -> points.
///
/// No partial credit, no negative points. Grade bonus is applied separately
/// per hit by the caller via [`grade_bonus`].
pub fn score_pick(pick_type: PickType, finish_position: i32, popularity: Option<i32>) -> PickScore {
    match pick_type {
        PickType::Win => {
            if finish_position == 1 {
                PickScore {
                    hit: true,
                    points: win_points(popularity),
                }
            } else {
                PickScore::MISS
            }
        }
        PickType::Place => {
            if is_placing(finish_position) {
                PickScore {
                    hit: true,
                    points: PLACE_POINTS,
                }
            } else {
                PickScore::MISS
            }
        }
        PickType::Back => {
            if is_placing(finish_position) {
                PickScore {
                    hit: true,
                    points: BACK_POINTS,
                }
            } else {
                PickScore::MISS
            }
        }
        PickType::Danger => {
            if !is_placing(finish_position) {
                PickScore {
                    hit: true,
                    points: DANGER_POINTS,
                }
            } else {
                PickScore::MISS
            }
        }
    }
}

/// Per-hit bonus for the race's grade. Ungraded races pay no bonus.
pub fn grade_bonus(grade: Option<&str>) -> i32 {
    let Some(grade) = grade else { return 0 };
    GRADE_BONUS
        .iter()
        .find(|(g, _)| *g == grade)
        .map(|(_, bonus)| *bonus)
        .unwrap_or(0)
}

/// Returns true if a winning pick on this popularity counts as an upset.
pub fn is_upset(popularity: Option<i32>) -> bool {
    popularity.is_some_and(|p| p >= UPSET_POPULARITY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_payout_steps_by_popularity() {
        assert_eq!(win_points(Some(1)), 30);
        assert_eq!(win_points(Some(2)), 50);
        assert_eq!(win_points(Some(3)), 50);
        assert_eq!(win_points(Some(5)), 80);
        assert_eq!(win_points(Some(7)), 120);
        assert_eq!(win_points(Some(9)), 200);
    }

    #[test]
    fn win_payout_ceiling_for_long_shots() {
        assert_eq!(win_points(Some(10)), WIN_POINTS_CEILING);
        assert_eq!(win_points(Some(18)), WIN_POINTS_CEILING);
        assert_eq!(win_points(None), WIN_POINTS_CEILING);
    }

    #[test]
    fn favored_winner_pays_low_tier() {
        // Popularity 1 finishing first: the smallest payout on the table.
        let score = score_pick(PickType::Win, 1, Some(1));
        assert!(score.hit);
        assert_eq!(score.points, 30);
    }

    #[test]
    fn win_misses_on_any_other_position() {
        for pos in 2..=18 {
            let score = score_pick(PickType::Win, pos, Some(1));
            assert!(!score.hit);
            assert_eq!(score.points, 0);
        }
    }

    #[test]
    fn place_and_back_pay_on_top_three() {
        for pos in 1..=3 {
            assert_eq!(score_pick(PickType::Place, pos, None).points, PLACE_POINTS);
            assert_eq!(score_pick(PickType::Back, pos, None).points, BACK_POINTS);
        }
        assert!(!score_pick(PickType::Place, 4, None).hit);
        assert!(!score_pick(PickType::Back, 4, None).hit);
    }

    #[test]
    fn danger_pays_only_outside_the_placings() {
        // A danger pick finishing 2nd is a miss: the placings cover top 3.
        let second = score_pick(PickType::Danger, 2, Some(1));
        assert!(!second.hit);
        assert_eq!(second.points, 0);

        let fourth = score_pick(PickType::Danger, 4, Some(1));
        assert!(fourth.hit);
        assert_eq!(fourth.points, DANGER_POINTS);
    }

    #[test]
    fn grade_bonus_table() {
        assert_eq!(grade_bonus(Some("G1")), 30);
        assert_eq!(grade_bonus(Some("G2")), 15);
        assert_eq!(grade_bonus(Some("G3")), 10);
        assert_eq!(grade_bonus(Some("L")), 5);
        assert_eq!(grade_bonus(Some("OP")), 5);
        assert_eq!(grade_bonus(Some("unknown")), 0);
        assert_eq!(grade_bonus(None), 0);
    }

    #[test]
    fn upset_threshold() {
        assert!(!is_upset(Some(9)));
        assert!(is_upset(Some(10)));
        assert!(is_upset(Some(15)));
        assert!(!is_upset(None));
    }
}
