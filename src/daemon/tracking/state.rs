use chrono::{DateTime, Local};

use crate::{daemon::storage::entities::Session, window_api::AppIdentity};

/// What the tracker currently knows about focus. A start time only exists together with an
/// application, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TrackerState {
    #[default]
    Idle,
    Tracking {
        app: AppIdentity,
        start: DateTime<Local>,
    },
}

impl TrackerState {
    pub fn current_app(&self) -> Option<&AppIdentity> {
        match self {
            TrackerState::Idle => None,
            TrackerState::Tracking { app, .. } => Some(app),
        }
    }

    /// Applies a new sample. Returns the next state and the session that ended, if focus moved
    /// away from a tracked application. Seeing the same application again changes nothing.
    pub fn detect(
        self,
        new_app: Option<AppIdentity>,
        now: DateTime<Local>,
    ) -> (TrackerState, Option<Session>) {
        if self.current_app() == new_app.as_ref() {
            return (self, None);
        }

        let finished = self.stop(now);
        let next = match new_app {
            Some(app) => TrackerState::Tracking { app, start: now },
            None => TrackerState::Idle,
        };
        (next, finished)
    }

    /// Closes the open session, if any.
    pub fn stop(self, now: DateTime<Local>) -> Option<Session> {
        match self {
            TrackerState::Idle => None,
            TrackerState::Tracking { app, start } => Some(Session::new(app, start, now)),
        }
    }
}
