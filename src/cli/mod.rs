pub mod daemon_path;
pub mod output;
pub mod process;
pub mod report;

use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use process::{restart_daemon, stop_daemon};
use report::{process_day_command, process_week_command, DayCommand, WeekCommand};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{start_daemon, DEFAULT_POLL_INTERVAL},
    utils::{
        dir::application_dir,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Screentime", version, long_about = None)]
#[command(about = "Application for tracking how long each application stays in focus", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init {
        #[arg(
            long,
            default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "How often the focused application is sampled"
        )]
        interval_ms: u64,
    },
    #[command(
        about = "Run a daemon directly in current console. Used for creating a daemon internally and for debugging"
    )]
    Serve {
        #[arg(
            long,
            default_value_t = DEFAULT_POLL_INTERVAL.as_millis() as u64,
            value_parser = clap::value_parser!(u64).range(1..),
            help = "How often the focused application is sampled"
        )]
        interval_ms: u64,
    },
    #[command(about = "Stop currently running daemon.")]
    Stop {},
    #[command(about = "Display screen time per day of a week and the applications used")]
    Week {
        #[command(flatten)]
        command: WeekCommand,
    },
    #[command(about = "Display screen time per hour of a day and the applications used")]
    Day {
        #[command(flatten)]
        command: DayCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let app_dir = application_dir(args.dir)?;
    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Init { interval_ms } => restart_daemon(&app_dir, interval_ms),
        Commands::Stop {} => stop_daemon(),
        Commands::Serve { interval_ms } => {
            start_daemon(app_dir, Duration::from_millis(interval_ms)).await
        }
        Commands::Week { command } => process_week_command(command, &app_dir),
        Commands::Day { command } => process_day_command(command, &app_dir),
    }
}
