//! Keeps track of which application holds focus and for how long. A small daemon samples the
//! focused application every second and stores one row per session, the cli turns those rows into
//! daily and weekly screen time reports.

pub mod cli;
pub mod daemon;
pub mod utils;
pub mod window_api;
