/// Bonus awarded every time the streak reaches a multiple of this length.
pub const STREAK_BONUS_EVERY: i32 = 3;
/// Points awarded for each streak-bonus milestone.
pub const STREAK_BONUS: i32 = 50;

/// Result of advancing a user's streak after one settled vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current: i32,
    pub best: i32,
    /// Bonus points earned by reaching a streak milestone with this vote.
    pub bonus: i32,
}

/// Advance the streak counters for one settled vote.
///
/// A hit extends the streak; a miss resets it to zero. `best` never
/// decreases. Every [`STREAK_BONUS_EVERY`]-th consecutive hit earns
/// [`STREAK_BONUS`] points, awarded exactly at the milestone.
pub fn advance(current: i32, best: i32, hit: bool) -> StreakUpdate {
    if !hit {
        return StreakUpdate {
            current: 0,
            best,
            bonus: 0,
        };
    }

    let current = current.saturating_add(1);
    let bonus = if current % STREAK_BONUS_EVERY == 0 {
        STREAK_BONUS
    } else {
        0
    };
    StreakUpdate {
        current,
        best: best.max(current),
        bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_extends_streak_and_best_follows() {
        let up = advance(0, 0, true);
        assert_eq!(up, StreakUpdate { current: 1, best: 1, bonus: 0 });

        let up = advance(4, 4, true);
        assert_eq!(up.current, 5);
        assert_eq!(up.best, 5);
    }

    #[test]
    fn miss_resets_current_but_keeps_best() {
        let up = advance(7, 9, false);
        assert_eq!(up, StreakUpdate { current: 0, best: 9, bonus: 0 });
    }

    #[test]
    fn best_is_not_lowered_by_a_shorter_streak() {
        let up = advance(2, 10, true);
        assert_eq!(up.current, 3);
        assert_eq!(up.best, 10);
    }

    #[test]
    fn bonus_fires_exactly_at_multiples_of_three() {
        assert_eq!(advance(1, 1, true).bonus, 0); // streak 2
        assert_eq!(advance(2, 2, true).bonus, STREAK_BONUS); // streak 3
        assert_eq!(advance(3, 3, true).bonus, 0); // streak 4
        assert_eq!(advance(5, 5, true).bonus, STREAK_BONUS); // streak 6
        assert_eq!(advance(8, 8, true).bonus, STREAK_BONUS); // streak 9
    }

    #[test]
    fn miss_never_pays_a_bonus() {
        assert_eq!(advance(2, 2, false).bonus, 0);
    }
}
