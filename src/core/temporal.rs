use chrono::{Datelike, NaiveDate, Utc, Weekday};

/// Current date in UTC as `YYYY-MM-DD`.
///
/// All scheduling comparisons in this crate are plain `Ord` on
/// `NaiveDate`, which matches lexicographic comparison of the
/// zero-padded serialized form.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// ISO-8601 week identifier (`YYYY-Www`, Monday-start, week 1 = week
/// containing the year's first Thursday) for the given date.
///
/// The ISO week year can differ from the calendar year at year
/// boundaries; `IsoWeek` handles that.
pub fn week_of(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}

/// The seven dates (Monday..Sunday) of the ISO week containing `date`.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let iso = date.iso_week();
    let monday =
        NaiveDate::from_isoywd_opt(iso.year(), iso.week(), Weekday::Mon).unwrap_or(date);
    std::array::from_fn(|i| monday + chrono::Duration::days(i as i64))
}

/// Format elapsed seconds for the focus timer: `H:MM:SS`, or `M:SS`
/// under an hour.
pub fn format_duration(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
