use chrono::{DateTime, Local};

use crate::{utils::time::timestamp_to_key, window_api::AppIdentity};

/// One contiguous interval during which a single application held focus. Sessions are created
/// when focus moves away from an application and are never changed afterwards.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Session {
    pub app: AppIdentity,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// Whole seconds between start and end.
    pub duration: i64,
}

impl Session {
    /// Closes an interval. An end before the start (clock moved backwards) collapses into a zero
    /// length session instead of a negative one.
    pub fn new(app: AppIdentity, start: DateTime<Local>, end: DateTime<Local>) -> Self {
        let end = end.max(start);
        Self {
            app,
            start,
            end,
            duration: (end - start).num_seconds(),
        }
    }
}

/// The row stored in the session table.
#[derive(PartialEq, Debug, Clone)]
pub struct SessionEntity {
    pub process_name: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: f64,
}

impl From<&Session> for SessionEntity {
    fn from(session: &Session) -> Self {
        SessionEntity {
            process_name: session.app.to_string(),
            start_time: timestamp_to_key(&session.start),
            end_time: timestamp_to_key(&session.end),
            duration: session.duration as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Local, NaiveDate, TimeZone};

    use super::{Session, SessionEntity};

    #[test]
    fn test_duration_is_floored() {
        let start = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 1, 7)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap(),
            )
            .unwrap();
        let session = Session::new(
            "Editor".into(),
            start,
            start + Duration::milliseconds(330_900),
        );

        assert_eq!(session.duration, 330);
        assert_eq!(
            SessionEntity::from(&session),
            SessionEntity {
                process_name: "Editor".into(),
                start_time: "2024-01-07 10:00:00.000000".into(),
                end_time: "2024-01-07 10:05:30.900000".into(),
                duration: 330.,
            }
        );
    }

    #[test]
    fn test_backwards_clock_gives_empty_session() {
        let start = Local::now();
        let session = Session::new("Editor".into(), start, start - Duration::seconds(5));

        assert_eq!(session.end, session.start);
        assert_eq!(session.duration, 0);
    }
}
