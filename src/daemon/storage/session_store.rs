use std::{path::Path, time::Duration};

use anyhow::Result;
use rusqlite::{params, Connection};
use tracing::{debug, info, instrument};

use super::entities::{Session, SessionEntity};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS screen_time_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    process_name TEXT,
    start_time TEXT,
    end_time TEXT,
    duration REAL
);

CREATE INDEX IF NOT EXISTS idx_screen_time_log_start ON screen_time_log(start_time);
"#;

/// Readers wait this long for the writer instead of failing right away.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Interface for abstracting storage of sessions. The log is append only, there is no way to
/// change or remove a session once it's written.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    /// Creates the session table if it's missing. Safe to call on every start.
    fn initialize(&self) -> Result<()>;

    /// Writes one session. A single insert, so it is either stored completely or not at all.
    fn append(&self, session: &Session) -> Result<()>;
}

/// The main realization of [SessionStore].
pub struct SqliteSessionStore {
    conn: Connection,
}

impl SqliteSessionStore {
    /// Opens or creates the database file and makes sure the schema exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        info!(?path, "Opening session store");
        let conn = Connection::open(path)?;

        // WAL lets report queries read while the tracker writes.
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Journal mode {mode}");
        conn.busy_timeout(BUSY_TIMEOUT)?;

        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Every stored session in the order they were written.
    pub fn all_sessions(&self) -> Result<Vec<SessionEntity>> {
        let mut statement = self.conn.prepare(
            "SELECT process_name, start_time, end_time, duration
             FROM screen_time_log
             ORDER BY id",
        )?;
        let sessions = statement
            .query_map([], |row| {
                Ok(SessionEntity {
                    process_name: row.get(0)?,
                    start_time: row.get(1)?,
                    end_time: row.get(2)?,
                    duration: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }
}

impl SessionStore for SqliteSessionStore {
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    #[instrument(skip(self))]
    fn append(&self, session: &Session) -> Result<()> {
        let entity = SessionEntity::from(session);
        self.conn.execute(
            "INSERT INTO screen_time_log (process_name, start_time, end_time, duration)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                entity.process_name,
                entity.start_time,
                entity.end_time,
                entity.duration
            ],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
    use tempfile::tempdir;

    use crate::daemon::storage::entities::{Session, SessionEntity};

    use super::{SessionStore, SqliteSessionStore};

    fn test_start_date() -> NaiveDateTime {
        NaiveDateTime::new(
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
            NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        )
    }

    fn test_session(app: &str, offset_s: i64, duration_s: i64) -> Session {
        let start =
            Local.from_local_datetime(&test_start_date()).unwrap() + Duration::seconds(offset_s);
        Session::new(app.into(), start, start + Duration::seconds(duration_s))
    }

    #[test]
    fn test_schema_created() -> Result<()> {
        let store = SqliteSessionStore::open_in_memory()?;
        let count: i32 = store.connection().query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='screen_time_log'",
            [],
            |row| row.get(0),
        )?;
        assert_eq!(count, 1);
        Ok(())
    }

    #[test]
    fn test_append_keeps_order() -> Result<()> {
        let store = SqliteSessionStore::open_in_memory()?;
        let sessions = [
            test_session("Editor", 0, 330),
            test_session("Browser", 330, 10),
            test_session("Editor", 340, 0),
        ];
        for session in &sessions {
            store.append(session)?;
        }

        assert_eq!(
            store.all_sessions()?,
            sessions.iter().map(SessionEntity::from).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_initialize_is_idempotent() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("usage_data.db");

        let store = SqliteSessionStore::open(&path)?;
        store.append(&test_session("Editor", 0, 60))?;
        store.initialize()?;
        store.initialize()?;
        drop(store);

        let reopened = SqliteSessionStore::open(&path)?;
        let sessions = reopened.all_sessions()?;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].process_name, "Editor");
        assert_eq!(sessions[0].duration, 60.);
        Ok(())
    }

    #[test]
    fn test_open_creates_parent_directory() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("usage_data.db");

        SqliteSessionStore::open(&path)?;

        assert!(path.exists());
        Ok(())
    }
}
