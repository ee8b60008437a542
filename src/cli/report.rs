use std::{fmt::Display, path::Path};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, ValueEnum};

use crate::{
    daemon::storage::queries::{open_read_only, UsageQueries},
    utils::dir::DATABASE_FILE_NAME,
};

use super::{
    output::{render_day, render_week, DayReport, WeekReport},
    Args,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Debug, Parser)]
pub struct DayCommand {
    #[arg(
        long,
        short,
        help = "Day to report, today by default. Examples are \"yesterday\", \"last friday\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print the report as json")]
    json: bool,
}

#[derive(Debug, Parser)]
pub struct WeekCommand {
    #[arg(
        long,
        short,
        help = "Any day of the Sunday to Saturday week to report, today by default. Examples are \"last week\", \"15/03/2025\""
    )]
    date: Option<String>,
    #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
    date_style: DateStyle,
    #[arg(long, help = "Print the report as json")]
    json: bool,
}

/// Turns a human date into a calendar day in local time.
fn parse_day(date: Option<String>, date_style: DateStyle) -> Result<NaiveDate> {
    let now = Local::now();
    match date.map(|s| parse_date_string(&s, now, date_style.into())) {
        Some(Ok(v)) => Ok(v.date_naive()),
        Some(Err(e)) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
        None => Ok(now.date_naive()),
    }
}

/// Prints hours per day of a week together with the applications used during it.
pub fn process_week_command(
    WeekCommand {
        date,
        date_style,
        json,
    }: WeekCommand,
    app_dir: &Path,
) -> Result<()> {
    let day = parse_day(date, date_style)?;
    let conn = open_read_only(&app_dir.join(DATABASE_FILE_NAME))?;
    let queries = UsageQueries::new(&conn);

    let totals = queries.weekly_totals_at(day)?;
    let report = WeekReport {
        summary: totals.summary(),
        totals,
        apps: queries.weekly_app_usage_at(day)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_week(&report));
    }
    Ok(())
}

/// Prints minutes per hour of a day together with the applications used during it.
pub fn process_day_command(
    DayCommand {
        date,
        date_style,
        json,
    }: DayCommand,
    app_dir: &Path,
) -> Result<()> {
    let day = parse_day(date, date_style)?;
    let conn = open_read_only(&app_dir.join(DATABASE_FILE_NAME))?;
    let queries = UsageQueries::new(&conn);

    let totals = queries.daily_totals(day)?;
    let report = DayReport {
        summary: totals.summary(),
        totals,
        apps: queries.daily_app_usage(day)?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_day(&report));
    }
    Ok(())
}
