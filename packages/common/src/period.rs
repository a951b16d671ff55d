use chrono::{Datelike, Days, Months, NaiveDate};

use crate::status::ContestType;

/// Natural idempotency key for a contest period.
///
/// Weekly contests are keyed by the Monday of their week (ISO date);
/// monthly contests by `YYYY-MM`. Re-running a scheduled trigger for the
/// same date always derives the same key.
pub fn period_key(contest_type: ContestType, date: NaiveDate) -> String {
    match contest_type {
        ContestType::Weekly => week_start(date).format("%Y-%m-%d").to_string(),
        ContestType::Monthly => date.format("%Y-%m").to_string(),
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Last day (Sunday) of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Days::new(6)
}

/// Period key of the month before the one containing `date`.
pub fn previous_monthly_key(date: NaiveDate) -> String {
    let prev = date - Months::new(1);
    prev.format("%Y-%m").to_string()
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).expect("first of month is always valid")
}

/// Human-readable contest name for a period.
pub fn contest_name(contest_type: ContestType, date: NaiveDate) -> String {
    match contest_type {
        ContestType::Weekly => format!("Weekly Contest {}", week_start(date).format("%Y/%m/%d")),
        ContestType::Monthly => format!("Monthly Contest {}", date.format("%Y-%m")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn week_start_is_monday() {
        // 2026-08-07 is a Friday.
        assert_eq!(week_start(d(2026, 8, 7)), d(2026, 8, 3));
        // A Monday maps to itself.
        assert_eq!(week_start(d(2026, 8, 3)), d(2026, 8, 3));
        // A Sunday maps back six days.
        assert_eq!(week_start(d(2026, 8, 9)), d(2026, 8, 3));
    }

    #[test]
    fn week_end_is_sunday() {
        assert_eq!(week_end(d(2026, 8, 7)), d(2026, 8, 9));
    }

    #[test]
    fn weekly_key_is_stable_across_the_week() {
        let friday = period_key(ContestType::Weekly, d(2026, 8, 7));
        let sunday = period_key(ContestType::Weekly, d(2026, 8, 9));
        assert_eq!(friday, "2026-08-03");
        assert_eq!(friday, sunday);
    }

    #[test]
    fn monthly_key_format() {
        assert_eq!(period_key(ContestType::Monthly, d(2026, 8, 1)), "2026-08");
        assert_eq!(period_key(ContestType::Monthly, d(2026, 12, 31)), "2026-12");
    }

    #[test]
    fn previous_monthly_key_crosses_year_boundary() {
        assert_eq!(previous_monthly_key(d(2026, 8, 1)), "2026-07");
        assert_eq!(previous_monthly_key(d(2026, 1, 15)), "2025-12");
    }

    #[test]
    fn month_start_is_the_first() {
        assert_eq!(month_start(d(2026, 8, 19)), d(2026, 8, 1));
    }

    #[test]
    fn contest_names_carry_the_period() {
        assert_eq!(
            contest_name(ContestType::Weekly, d(2026, 8, 7)),
            "Weekly Contest 2026/08/03"
        );
        assert_eq!(
            contest_name(ContestType::Monthly, d(2026, 8, 7)),
            "Monthly Contest 2026-08"
        );
    }
}
