//! Calendar month helpers on UTC calendar dates

use chrono::{Datelike, Months, NaiveDate};

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date.year(), date.month()))
        .unwrap_or(date)
}

/// First day of the month after the one containing `date`
///
/// `None` only past chrono's representable range.
pub fn next_month_start(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Last day of the month `months` after the one containing `date`
pub fn month_end_after(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    month_start(date)
        .checked_add_months(Months::new(months))
        .map(month_end)
}

/// Same calendar month and year (day ignored)
pub fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(2024, 4), 30);
        assert_eq!(days_in_month(2024, 12), 31);
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_start(date(2024, 2, 17)), date(2024, 2, 1));
        assert_eq!(month_end(date(2024, 2, 17)), date(2024, 2, 29));
        assert_eq!(month_end(date(2023, 2, 1)), date(2023, 2, 28));
        assert_eq!(next_month_start(date(2024, 12, 31)), Some(date(2025, 1, 1)));
        assert_eq!(next_month_start(date(2024, 1, 31)), Some(date(2024, 2, 1)));
    }

    #[test]
    fn test_same_month_and_days_between() {
        assert!(same_month(date(2024, 3, 1), date(2024, 3, 31)));
        assert!(!same_month(date(2024, 3, 1), date(2025, 3, 1)));
        assert_eq!(days_between(date(2024, 2, 1), date(2024, 2, 29)), 28);
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 3, 1)), 0);
    }

    #[test]
    fn test_month_end_after() {
        assert_eq!(month_end_after(date(2024, 1, 15), 1), Some(date(2024, 2, 29)));
        assert_eq!(month_end_after(date(2024, 1, 15), 239), Some(date(2043, 12, 31)));
        assert_eq!(month_end_after(date(2024, 11, 30), 0), Some(date(2024, 11, 30)));
    }
}
