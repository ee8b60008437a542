use std::{
    panic::{self, AssertUnwindSafe},
    time::Duration,
};

use anyhow::{anyhow, Result};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::{
    daemon::storage::entities::Session,
    utils::clock::Clock,
    window_api::{resolve_foreground_app, AppIdentity, WindowManager},
};

use super::state::TrackerState;

/// Polls the focused application and turns focus changes into finished sessions, which are sent
/// to the processing module.
pub struct ActivityTracker {
    next: mpsc::Sender<Session>,
    producer: Box<dyn WindowManager>,
    shutdown: CancellationToken,
    poll_interval: Duration,
    time_provider: Box<dyn Clock>,
}

impl ActivityTracker {
    pub fn new(
        next: mpsc::Sender<Session>,
        producer: Box<dyn WindowManager>,
        shutdown: CancellationToken,
        poll_interval: Duration,
        time_provider: Box<dyn Clock>,
    ) -> Self {
        Self {
            next,
            producer,
            shutdown,
            poll_interval,
            time_provider,
        }
    }

    /// Closes the open session so nothing is lost on shutdown or failure.
    fn close(&self, state: TrackerState) -> Option<Session> {
        let session = state.stop(self.time_provider.time());
        if let Some(session) = &session {
            info!("Closing session of {} before stopping", session.app);
        }
        session
    }

    /// Asks the window manager for the focused application. A panicking backend is turned into
    /// an error so the loop can still save what it was tracking.
    fn resolve(&mut self) -> Result<Option<AppIdentity>> {
        let producer = self.producer.as_mut();
        panic::catch_unwind(AssertUnwindSafe(|| resolve_foreground_app(producer))).map_err(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|v| v.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                anyhow!("Window manager panicked: {message}")
            },
        )
    }

    /// Executes the tracking loop until shutdown is requested. A failure inside the loop flushes
    /// the open session, requests shutdown of the rest of the daemon and returns the error.
    pub async fn run(mut self) -> Result<()> {
        let mut state = TrackerState::Idle;
        let mut poll_point = self.time_provider.instant();
        loop {
            poll_point += self.poll_interval;

            let app = match self.resolve() {
                Ok(app) => app,
                Err(e) => {
                    error!("Tracking loop failed, stopping {e:?}");
                    self.shutdown.cancel();
                    // The processing module keeps draining until this sender is dropped.
                    let last = self.close(state);
                    if let Some(last) = last {
                        if let Err(send_error) = send_session(&self.next, last).await {
                            error!("Lost the open session of the failed loop {send_error:?}");
                        }
                    }
                    return Err(e);
                }
            };
            let (next_state, finished) = state.detect(app, self.time_provider.time());
            state = next_state;

            if let Some(session) = finished {
                // The processing side is gone, nothing can be saved anymore.
                if let Err(e) = send_session(&self.next, session).await {
                    error!("Session channel closed, stopping {e:?}");
                    self.shutdown.cancel();
                    return Err(e);
                }
            }

            tokio::select! {
                // Cancelation flushes the open session and drops the sender, which stops the
                // processing module once it has saved everything.
                _ = self.shutdown.cancelled() => {
                    let last = self.close(state);
                    return match last {
                        Some(last) => send_session(&self.next, last).await,
                        None => Ok(()),
                    };
                }
                _ = self.time_provider.sleep_until(poll_point) => ()
            }
        }
    }
}

async fn send_session(next: &mpsc::Sender<Session>, session: Session) -> Result<()> {
    let span = info_span!("Sending finished session");
    debug!("Sending session {:?}", session);
    next.send(session)
        .instrument(span)
        .await
        .inspect_err(|e| error!("Unexpected error during sending {e:?}"))?;
    Ok(())
}
