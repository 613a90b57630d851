use std::ops::RangeInclusive;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{Table, TableComponent};

/// Table with the light border style used for every listing
pub(crate) fn new_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

/// Last representable instant of a day, 23:59:59.999
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

/// From the start of `start` to the last millisecond of `end`
pub(crate) fn days_between(start: NaiveDate, end: NaiveDate) -> RangeInclusive<NaiveDateTime> {
    start.and_time(NaiveTime::MIN)..=end_of_day(end)
}

/// Last day of the month `date` falls in
pub(crate) fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 { (date.year() + 1, 1) } else { (date.year(), date.month() + 1) };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|first_of_next| first_of_next - Duration::days(1))
        .unwrap_or(date)
}

/// From the first day of `start`'s month to the last instant of `end`'s month
pub(crate) fn months_between(start: NaiveDate, end: NaiveDate) -> RangeInclusive<NaiveDateTime> {
    let first = start.with_day(1).unwrap_or(start);
    days_between(first, last_day_of_month(end))
}

/// The same month one year earlier, keeping the first day
pub(crate) fn same_month_last_year(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year() - 1, date.month(), 1).unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(last_day_of_month(date(2024, 2, 10)), date(2024, 2, 29));
        assert_eq!(last_day_of_month(date(2023, 12, 1)), date(2023, 12, 31));
    }

    #[test]
    fn test_months_between() {
        let range = months_between(date(2024, 3, 15), date(2024, 4, 2));
        assert_eq!(*range.start(), date(2024, 3, 1).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(*range.end(), date(2024, 4, 30).and_hms_milli_opt(23, 59, 59, 999).unwrap());
        assert!(range.contains(&date(2024, 4, 30).and_hms_opt(18, 0, 0).unwrap()));
        assert!(!range.contains(&date(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap()));
    }

    #[test]
    fn test_same_month_last_year() {
        assert_eq!(same_month_last_year(date(2024, 2, 29)), date(2023, 2, 1));
    }
}
