use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Weekday};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Canonical completion key for a calendar day.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

pub fn last_n_days(n: u32) -> Vec<NaiveDate> {
    last_n_days_from(today(), n)
}

/// `n` consecutive days, oldest first, the last one being `end`.
pub fn last_n_days_from(end: NaiveDate, n: u32) -> Vec<NaiveDate> {
    (0..n)
        .rev()
        .map(|offset| end - Duration::days(i64::from(offset)))
        .collect()
}

pub fn is_today(date: NaiveDate) -> bool {
    is_today_at(date, today())
}

pub fn is_today_at(date: NaiveDate, today: NaiveDate) -> bool {
    date == today
}

pub fn is_future(date: NaiveDate) -> bool {
    is_future_at(date, today())
}

pub fn is_future_at(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

pub fn format_date_display(date: NaiveDate) -> String {
    let label = match date.weekday() {
        Weekday::Mon => "MON",
        Weekday::Tue => "TUE",
        Weekday::Wed => "WED",
        Weekday::Thu => "THU",
        Weekday::Fri => "FRI",
        Weekday::Sat => "SAT",
        Weekday::Sun => "SUN",
    };
    format!("{label} {}", date.day())
}

/// Local calendar day of a habit's creation timestamp.
///
/// Accepts RFC 3339 date-times and bare `YYYY-MM-DD` dates. Anything else is
/// treated as created on `today`, which makes the habit look brand new rather
/// than failing the stats request.
pub fn created_date(created_at: &str, today: NaiveDate) -> NaiveDate {
    if let Ok(instant) = DateTime::parse_from_rfc3339(created_at) {
        return instant.with_timezone(&Local).date_naive();
    }
    parse_date(created_at).unwrap_or(today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn format_date_zero_pads_month_and_day() {
        assert_eq!(format_date(day(2026, 3, 7)), "2026-03-07");
        assert_eq!(format_date(day(2026, 12, 31)), "2026-12-31");
    }

    #[test]
    fn same_calendar_day_formats_identically() {
        let morning = Local::now().date_naive().and_hms_opt(0, 5, 0).unwrap();
        let evening = morning.date().and_hms_opt(23, 55, 0).unwrap();
        assert_eq!(format_date(morning.date()), format_date(evening.date()));
    }

    #[test]
    fn parse_date_rejects_other_shapes() {
        assert_eq!(parse_date("2026-01-05"), Some(day(2026, 1, 5)));
        assert_eq!(parse_date("2026-1-5"), None);
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date("../etc/passwd"), None);
    }

    #[test]
    fn last_n_days_ends_at_today_oldest_first() {
        let today = day(2026, 3, 2);
        let days = last_n_days_from(today, 4);
        assert_eq!(
            days,
            vec![day(2026, 2, 27), day(2026, 2, 28), day(2026, 3, 1), day(2026, 3, 2)]
        );
        assert!(last_n_days_from(today, 0).is_empty());
        assert_eq!(last_n_days(7).len(), 7);
    }

    #[test]
    fn future_check_is_day_granular() {
        let today = day(2026, 1, 5);
        assert!(is_today_at(today, today));
        assert!(!is_future_at(today, today));
        assert!(is_future_at(day(2026, 1, 6), today));
        assert!(!is_future_at(day(2026, 1, 4), today));
    }

    #[test]
    fn days_between_crosses_month_and_dst_boundaries() {
        assert_eq!(days_between(day(2026, 3, 28), day(2026, 3, 30)), 2);
        assert_eq!(days_between(day(2026, 10, 24), day(2026, 10, 26)), 2);
        assert_eq!(days_between(day(2026, 1, 5), day(2026, 1, 5)), 0);
    }

    #[test]
    fn display_label_uses_weekday_and_day() {
        assert_eq!(format_date_display(day(2026, 1, 26)), "MON 26");
        assert_eq!(format_date_display(day(2026, 2, 1)), "SUN 1");
    }

    #[test]
    fn created_date_falls_back_to_today() {
        let today = day(2026, 1, 5);
        assert_eq!(created_date("2025-12-20", today), day(2025, 12, 20));
        assert_eq!(created_date("not a date", today), today);
        assert_eq!(created_date("", today), today);
        let local = Local::now();
        assert_eq!(created_date(&local.to_rfc3339(), today), local.date_naive());
    }
}
