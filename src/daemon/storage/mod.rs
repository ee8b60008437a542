//!  Storage is organized through [session_store::SqliteSessionStore].
//!  The basic idea is:
//!   - There is a single sqlite file with an append only table of sessions.
//!   - A session is one stretch of time a single application held focus.
//!   - Timestamps are local wall clock strings, reports group on their date and hour prefixes.

pub mod entities;
pub mod queries;
pub mod session_store;
