//! Calendar arithmetic for subscription periods and attendance sessions

use chrono::{DateTime, Months, TimeDelta, Utc};

use crate::types::DurationUnit;

/// Advance `start` by `duration` units, calendar-aware.
///
/// Month (and year, expressed as 12·n months) addition clamps to the last
/// valid day of the target month: Jan 31 + 1 month lands on Feb 29 in a
/// leap year and Feb 28 otherwise, never on Mar 2. Returns `None` only if
/// the result falls outside the representable date range.
pub fn advance_period(
    start: DateTime<Utc>,
    duration: u32,
    unit: DurationUnit,
) -> Option<DateTime<Utc>> {
    match unit {
        DurationUnit::Days => start.checked_add_signed(TimeDelta::try_days(i64::from(duration))?),
        DurationUnit::Months => start.checked_add_months(Months::new(duration)),
        DurationUnit::Years => start.checked_add_months(Months::new(duration.checked_mul(12)?)),
    }
}

/// Whole minutes between check-in and check-out, truncated (floor).
///
/// A 125-second session is 2 minutes. Clock skew that puts check-out
/// before check-in yields 0 rather than a negative duration.
pub fn session_minutes(check_in: DateTime<Utc>, check_out: DateTime<Utc>) -> i32 {
    let seconds = (check_out - check_in).num_seconds();
    if seconds <= 0 {
        return 0;
    }
    (seconds / 60).min(i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
    }

    #[test]
    fn one_month_from_jan_31_clamps_to_leap_feb_29() {
        let end = advance_period(at(2024, 1, 31), 1, DurationUnit::Months).unwrap();
        assert_eq!(end, at(2024, 2, 29));
    }

    #[test]
    fn one_month_from_jan_31_clamps_to_feb_28_off_leap() {
        let end = advance_period(at(2023, 1, 31), 1, DurationUnit::Months).unwrap();
        assert_eq!(end, at(2023, 2, 28));
    }

    #[test]
    fn months_roll_across_year_boundary() {
        let end = advance_period(at(2024, 11, 15), 3, DurationUnit::Months).unwrap();
        assert_eq!(end, at(2025, 2, 15));
    }

    #[test]
    fn days_are_exact() {
        let end = advance_period(at(2024, 2, 27), 7, DurationUnit::Days).unwrap();
        assert_eq!(end, at(2024, 3, 5));
    }

    #[test]
    fn years_clamp_leap_day() {
        // Feb 29 + 1 year is Feb 28, not an invalid date or Mar 1.
        let end = advance_period(at(2024, 2, 29), 1, DurationUnit::Years).unwrap();
        assert_eq!(end, at(2025, 2, 28));
    }

    #[test]
    fn session_minutes_floors() {
        let check_in = at(2024, 5, 1);
        let check_out = check_in + TimeDelta::seconds(125);
        assert_eq!(session_minutes(check_in, check_out), 2);
    }

    #[test]
    fn session_minutes_sub_minute_is_zero() {
        let check_in = at(2024, 5, 1);
        assert_eq!(session_minutes(check_in, check_in + TimeDelta::seconds(59)), 0);
    }

    #[test]
    fn session_minutes_never_negative() {
        let check_in = at(2024, 5, 1);
        assert_eq!(session_minutes(check_in, check_in - TimeDelta::seconds(30)), 0);
    }
}
