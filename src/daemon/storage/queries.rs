//! Read only reports over the session log. Sessions are attributed to the calendar day and hour
//! they started in, by slicing the textual `start_time` column.

use std::{collections::HashMap, path::Path, time::Duration as StdDuration};

use anyhow::{bail, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use rusqlite::{params, Connection, OpenFlags};
use tracing::debug;
use serde::Serialize;

use crate::utils::time::date_to_key;

pub const DAYS_IN_WEEK: usize = 7;
pub const HOURS_IN_DAY: usize = 24;

/// Total hours for each day of the week, starting on Sunday.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyTotals {
    pub days: Vec<NaiveDate>,
    pub hours: Vec<f64>,
}

/// Total minutes for every hour of a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub hours: Vec<u32>,
    pub minutes: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppUsage {
    pub app: String,
    pub minutes: f64,
}

/// Total and average of a set of buckets in minutes. The average skips empty buckets, so a week
/// with two active days is averaged over those two days.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UsageSummary {
    pub total_minutes: f64,
    pub average_minutes: f64,
}

impl UsageSummary {
    pub fn from_minutes(buckets: &[f64]) -> Self {
        let total_minutes: f64 = buckets.iter().sum();
        let active = buckets.iter().filter(|v| **v > 0.).count();
        let average_minutes = if active == 0 {
            0.
        } else {
            total_minutes / active as f64
        };
        Self {
            total_minutes,
            average_minutes,
        }
    }
}

impl WeeklyTotals {
    pub fn summary(&self) -> UsageSummary {
        UsageSummary::from_minutes(&self.hours.iter().map(|v| v * 60.).collect::<Vec<_>>())
    }
}

impl DailyTotals {
    pub fn summary(&self) -> UsageSummary {
        UsageSummary::from_minutes(&self.minutes)
    }
}

/// The most recent Sunday on or before `today`.
pub fn last_sunday(today: NaiveDate) -> NaiveDate {
    today - Duration::days(today.weekday().num_days_from_sunday() as i64)
}

/// Sunday to Saturday window containing `today`, both ends inclusive.
fn week_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = last_sunday(today);
    (start, start + Duration::days(DAYS_IN_WEEK as i64 - 1))
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Opens the session log for reading. Nothing is created or changed, a missing database is an
/// error.
pub fn open_read_only(path: &Path) -> Result<Connection> {
    if !path.is_file() {
        bail!("No usage data at {path:?}. Start tracking with `screentime init` first");
    }
    debug!(?path, "Opening session log for reading");
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(StdDuration::from_secs(5))?;
    Ok(conn)
}

pub struct UsageQueries<'c> {
    conn: &'c Connection,
}

impl<'c> UsageQueries<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn weekly_totals(&self) -> Result<WeeklyTotals> {
        self.weekly_totals_at(local_today())
    }

    /// Hours per day for the week containing `today`. Days without sessions are 0.
    pub fn weekly_totals_at(&self, today: NaiveDate) -> Result<WeeklyTotals> {
        let (start, end) = week_window(today);
        let mut statement = self.conn.prepare(
            "SELECT substr(start_time, 1, 10) AS day, SUM(duration) / 3600.0 AS hours
             FROM screen_time_log
             WHERE substr(start_time, 1, 10) BETWEEN ?1 AND ?2
             GROUP BY day",
        )?;
        let totals = statement
            .query_map(params![date_to_key(start), date_to_key(end)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        let days = (0..DAYS_IN_WEEK as i64)
            .map(|offset| start + Duration::days(offset))
            .collect::<Vec<_>>();
        let hours = days
            .iter()
            .map(|day| totals.get(&date_to_key(*day)).copied().unwrap_or(0.))
            .collect();
        Ok(WeeklyTotals { days, hours })
    }

    /// Minutes per hour of `date`. Hours without sessions are 0.
    pub fn daily_totals(&self, date: NaiveDate) -> Result<DailyTotals> {
        let mut statement = self.conn.prepare(
            "SELECT substr(start_time, 12, 2) AS hour, SUM(duration) / 60.0 AS minutes
             FROM screen_time_log
             WHERE substr(start_time, 1, 10) = ?1
             GROUP BY hour",
        )?;
        let totals = statement
            .query_map(params![date_to_key(date)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })?
            .collect::<Result<HashMap<_, _>, _>>()?;

        let hours = (0..HOURS_IN_DAY as u32).collect::<Vec<_>>();
        let minutes = hours
            .iter()
            .map(|hour| totals.get(&format!("{hour:02}")).copied().unwrap_or(0.))
            .collect();
        Ok(DailyTotals {
            date,
            hours,
            minutes,
        })
    }

    /// Minutes per application on `date`, most used first.
    pub fn daily_app_usage(&self, date: NaiveDate) -> Result<Vec<AppUsage>> {
        self.app_usage_between(date, date)
    }

    pub fn weekly_app_usage(&self) -> Result<Vec<AppUsage>> {
        self.weekly_app_usage_at(local_today())
    }

    /// Minutes per application for the week containing `today`, most used first.
    pub fn weekly_app_usage_at(&self, today: NaiveDate) -> Result<Vec<AppUsage>> {
        let (start, end) = week_window(today);
        self.app_usage_between(start, end)
    }

    /// Equal totals are ordered by name so repeated reports look the same.
    fn app_usage_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<AppUsage>> {
        let mut statement = self.conn.prepare(
            "SELECT process_name, SUM(duration) / 60.0 AS minutes
             FROM screen_time_log
             WHERE substr(start_time, 1, 10) BETWEEN ?1 AND ?2
             GROUP BY process_name
             ORDER BY minutes DESC, process_name ASC",
        )?;
        let usage = statement
            .query_map(params![date_to_key(start), date_to_key(end)], |row| {
                Ok(AppUsage {
                    app: row.get(0)?,
                    minutes: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(usage)
    }
}
