use std::{path::PathBuf, time::Duration};

use anyhow::Result;
use processing::{local_save::LocalSaver, ProcessingModule};
use storage::{
    entities::Session,
    session_store::{SessionStore, SqliteSessionStore},
};
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracking::tracker::ActivityTracker;

use crate::{
    utils::{
        clock::{Clock, DefaultClock},
        dir::DATABASE_FILE_NAME,
    },
    window_api::{GenericWindowManager, WindowManager},
};

pub mod args;
pub mod processing;
pub mod shutdown;
pub mod storage;
pub mod tracking;

#[cfg(test)]
mod test_utils;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Represents the starting point for the daemon
pub async fn start_daemon(dir: PathBuf, poll_interval: Duration) -> Result<()> {
    let store = SqliteSessionStore::open(&dir.join(DATABASE_FILE_NAME))?;
    let manager = GenericWindowManager::new()?;

    let service = TrackingService::start_tracking(store, manager, DefaultClock, poll_interval);

    shutdown::detect_shutdown(service.shutdown_token()).await;

    service.stop_tracking().await
}

/// A running tracker together with the module saving its sessions.
pub struct TrackingService {
    shutdown: CancellationToken,
    task: JoinHandle<Result<()>>,
}

impl TrackingService {
    pub fn start_tracking(
        store: impl SessionStore + Send + 'static,
        manager: impl WindowManager + 'static,
        clock: impl Clock,
        poll_interval: Duration,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let (sender, receiver) = mpsc::channel::<Session>(10);

        let tracker = create_tracker(sender, manager, &shutdown, clock, poll_interval);
        let processor = create_processor(store, receiver);

        let task = tokio::spawn(async move {
            let (tracking_result, processing_result) =
                tokio::join!(tracker.run(), processor.run());

            if let Err(e) = &tracking_result {
                error!("Tracking module got an error {:?}", e);
            }

            if let Err(e) = &processing_result {
                error!("Processing module got an error {:?}", e);
            }

            tracking_result.and(processing_result)
        });
        info!("Started tracking every {poll_interval:?}");

        Self { shutdown, task }
    }

    /// Cancelled once stop is requested or the tracker gave up on its own.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Stops polling and waits until the open session is saved.
    pub async fn stop_tracking(self) -> Result<()> {
        self.shutdown.cancel();
        self.task.await?
    }
}

fn create_tracker(
    sender: mpsc::Sender<Session>,
    manager: impl WindowManager + 'static,
    shutdown_token: &CancellationToken,
    clock: impl Clock,
    poll_interval: Duration,
) -> ActivityTracker {
    ActivityTracker::new(
        sender,
        Box::new(manager),
        shutdown_token.clone(),
        poll_interval,
        Box::new(clock),
    )
}

fn create_processor<S: SessionStore + Send>(
    store: S,
    receiver: mpsc::Receiver<Session>,
) -> ProcessingModule<LocalSaver<S>> {
    ProcessingModule::new(receiver, LocalSaver::new(store))
}

#[cfg(test)]
mod daemon_tests {
    use std::{path::PathBuf, time::Duration};

    use anyhow::{anyhow, Result};
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        daemon::{
            storage::{
                entities::SessionEntity, queries::UsageQueries,
                session_store::SqliteSessionStore,
            },
            test_utils::{PanickingWindowManager, TestClock},
            TrackingService,
        },
        utils::{dir::DATABASE_FILE_NAME, logging::TEST_LOGGING},
        window_api::{ForegroundProcess, MockWindowManager},
    };

    fn process(name: &str, executable: Option<&str>) -> ForegroundProcess {
        ForegroundProcess {
            pid: 7,
            process_name: name.into(),
            executable: executable.map(PathBuf::from),
        }
    }

    fn test_window_manager() -> MockWindowManager {
        let mut manager = MockWindowManager::new();
        let mut sample = 0;
        manager.expect_get_foreground_process().returning(move || {
            sample += 1;
            match sample {
                3 => Ok(Some(process("browser", None))),
                4 => Err(anyhow!("Process exited")),
                _ => Ok(Some(process("editor", Some("/usr/bin/editor")))),
            }
        });
        manager
            .expect_get_file_description()
            .returning(|_| Ok("Text Editor".into()));
        manager
    }

    /// Runs the whole daemon against a scripted window manager on a paused clock.
    #[tokio::test(start_paused = true)]
    async fn smoke_test_daemon() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let path = dir.path().join(DATABASE_FILE_NAME);

        let service = TrackingService::start_tracking(
            SqliteSessionStore::open(&path)?,
            test_window_manager(),
            TestClock::new(),
            Duration::from_secs(1),
        );

        tokio::time::sleep(Duration::from_millis(5500)).await;
        service.stop_tracking().await?;

        let store = SqliteSessionStore::open(&path)?;
        let session = |name: &str, start: &str, end: &str, duration: f64| SessionEntity {
            process_name: name.into(),
            start_time: format!("2024-01-07 {start}"),
            end_time: format!("2024-01-07 {end}"),
            duration,
        };
        assert_eq!(
            store.all_sessions()?,
            vec![
                session("Text Editor", "10:00:00.000000", "10:00:02.000000", 2.),
                session("browser", "10:00:02.000000", "10:00:03.000000", 1.),
                session("Text Editor", "10:00:04.000000", "10:00:05.500000", 1.),
            ]
        );

        let queries = UsageQueries::new(store.connection());
        let day = NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        let apps = queries.daily_app_usage(day)?;
        assert_eq!(apps[0].app, "Text Editor");
        assert_eq!(apps[0].minutes, 3. / 60.);
        assert_eq!(queries.daily_totals(day)?.minutes[10], 4. / 60.);

        Ok(())
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_loop_saves_open_session() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let path = dir.path().join(DATABASE_FILE_NAME);

        let service = TrackingService::start_tracking(
            SqliteSessionStore::open(&path)?,
            PanickingWindowManager {
                app: "A",
                healthy_samples: 3,
            },
            TestClock::new(),
            Duration::from_secs(1),
        );
        let shutdown = service.shutdown_token();

        // The service stops itself once the backend fails.
        shutdown.cancelled().await;
        assert!(service.stop_tracking().await.is_err());

        let sessions = SqliteSessionStore::open(&path)?.all_sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].process_name, "A");
        assert_eq!(sessions[0].duration, 3.);
        assert_eq!(sessions[0].start_time, "2024-01-07 10:00:00.000000");
        assert_eq!(sessions[0].end_time, "2024-01-07 10:00:03.000000");
        Ok(())
    }
}
