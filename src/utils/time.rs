use chrono::{DateTime, Local, NaiveDate};

/// Layout of timestamps in the session table. The first 10 characters are the date and characters
/// 12-13 the hour, which is what the aggregation queries slice on.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// This is the standard way of converting a date to a string in screentime.
pub fn date_to_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Formats a moment as local wall clock time.
pub fn timestamp_to_key(moment: &DateTime<Local>) -> String {
    moment.naive_local().format(TIMESTAMP_FORMAT).to_string()
}
