//! Text rendering of the reports. Kept free of any io so it can be tested directly.

use serde::Serialize;

use crate::daemon::storage::queries::{AppUsage, DailyTotals, UsageSummary, WeeklyTotals};

#[derive(Debug, Serialize)]
pub struct WeekReport {
    pub totals: WeeklyTotals,
    pub summary: UsageSummary,
    pub apps: Vec<AppUsage>,
}

#[derive(Debug, Serialize)]
pub struct DayReport {
    pub totals: DailyTotals,
    pub summary: UsageSummary,
    pub apps: Vec<AppUsage>,
}

/// Formats minutes as `1h 05m`.
pub fn format_minutes(minutes: f64) -> String {
    let minutes = minutes.round().max(0.) as i64;
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}

fn render_summary(summary: &UsageSummary) -> String {
    format!(
        "Total: {}\tAverage: {}\n",
        format_minutes(summary.total_minutes),
        format_minutes(summary.average_minutes)
    )
}

fn render_apps(apps: &[AppUsage]) -> String {
    if apps.is_empty() {
        return "No activity recorded\n".into();
    }
    apps.iter()
        .map(|usage| format!("{}\t{}\n", format_minutes(usage.minutes), usage.app))
        .collect()
}

pub fn render_week(report: &WeekReport) -> String {
    let mut out = String::new();
    for (day, hours) in report.totals.days.iter().zip(&report.totals.hours) {
        out.push_str(&format!(
            "{}\t{}\n",
            day.format("%a %Y-%m-%d"),
            format_minutes(hours * 60.)
        ));
    }
    out.push('\n');
    out.push_str(&render_summary(&report.summary));
    out.push('\n');
    out.push_str(&render_apps(&report.apps));
    out
}

pub fn render_day(report: &DayReport) -> String {
    let mut out = format!("{}\n", report.totals.date.format("%b %d (%A)"));
    for (hour, minutes) in report.totals.hours.iter().zip(&report.totals.minutes) {
        out.push_str(&format!("{hour:02}:00\t{}\n", format_minutes(*minutes)));
    }
    out.push('\n');
    out.push_str(&render_summary(&report.summary));
    out.push('\n');
    out.push_str(&render_apps(&report.apps));
    out
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::daemon::storage::queries::{AppUsage, DailyTotals, WeeklyTotals};

    use super::{format_minutes, render_day, render_week, DayReport, WeekReport};

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(0.), "0h 00m");
        assert_eq!(format_minutes(5.667), "0h 06m");
        assert_eq!(format_minutes(59.7), "1h 00m");
        assert_eq!(format_minutes(125.), "2h 05m");
    }

    #[test]
    fn test_render_week() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let totals = WeeklyTotals {
            days: (0..7).map(|v| start + Duration::days(v)).collect(),
            hours: vec![1.5, 0., 0., 0.5, 0., 0., 0.],
        };
        let report = WeekReport {
            summary: totals.summary(),
            totals,
            apps: vec![AppUsage {
                app: "Editor".into(),
                minutes: 120.,
            }],
        };

        let rendered = render_week(&report);
        let lines = rendered.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Sun 2024-01-07\t1h 30m");
        assert_eq!(lines[6], "Sat 2024-01-13\t0h 00m");
        assert_eq!(lines[8], "Total: 2h 00m\tAverage: 1h 00m");
        assert_eq!(lines[10], "2h 00m\tEditor");
    }

    #[test]
    fn test_render_empty_day() {
        let totals = DailyTotals {
            date: NaiveDate::from_ymd_opt(2024, 1, 9).unwrap(),
            hours: (0..24).collect(),
            minutes: vec![0.; 24],
        };
        let report = DayReport {
            summary: totals.summary(),
            totals,
            apps: vec![],
        };

        let rendered = render_day(&report);
        let lines = rendered.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "Jan 09 (Tuesday)");
        assert_eq!(lines[1], "00:00\t0h 00m");
        assert_eq!(lines[24], "23:00\t0h 00m");
        assert_eq!(lines[26], "Total: 0h 00m\tAverage: 0h 00m");
        assert_eq!(lines[28], "No activity recorded");
    }
}
