use std::path::Path;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeZone};
use tokio::time::Instant;

use crate::{
    utils::clock::Clock,
    window_api::{ForegroundProcess, WindowManager},
};

/// Clock following tokio time, so paused tests produce exact session boundaries.
#[derive(Clone)]
pub struct TestClock {
    start_time: DateTime<Local>,
    reference: Instant,
}

impl TestClock {
    /// Starts at 2024-01-07 10:00, a Sunday.
    pub fn new() -> Self {
        let start = NaiveDate::from_ymd_opt(2024, 1, 7)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Self {
            start_time: Local.from_local_datetime(&start).unwrap(),
            reference: Instant::now(),
        }
    }

    pub fn elapsed_seconds(&self) -> i64 {
        (self.time() - self.start_time).num_seconds()
    }
}

impl Default for TestClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Reports `app` in focus for a number of samples and then panics, like a crashing backend.
pub struct PanickingWindowManager {
    pub app: &'static str,
    pub healthy_samples: usize,
}

impl WindowManager for PanickingWindowManager {
    fn get_foreground_process(&mut self) -> Result<Option<ForegroundProcess>> {
        if self.healthy_samples == 0 {
            panic!("window backend crashed");
        }
        self.healthy_samples -= 1;
        Ok(Some(ForegroundProcess {
            pid: 1,
            process_name: self.app.into(),
            executable: None,
        }))
    }

    fn get_file_description(&mut self, executable: &Path) -> Result<String> {
        Err(anyhow!("{executable:?} has no description"))
    }
}

#[async_trait]
impl Clock for TestClock {
    fn time(&self) -> DateTime<Local> {
        self.start_time + self.reference.elapsed()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: tokio::time::Instant) {
        tokio::time::sleep_until(instant).await;
    }
}
