//! SQLite document store for plans.
//!
//! Each plan is one row holding the whole plan as JSON, plus a revision
//! number. Writes are conditional on the revision the caller last read, so
//! a concurrent writer is detected instead of silently overwritten. What to
//! do about a lost race is up to the caller; see [`crate::planner`].

use std::{path::Path, time::Duration};

use rusqlite::Connection;

use crate::{
    error::{DatabaseResultExt, Result},
    models::Plan,
};

pub mod migrations;
pub mod plan_queries;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

/// A plan document together with the revision it was read at.
#[derive(Debug, Clone)]
pub struct StoredPlan {
    pub plan: Plan,
    pub revision: i64,
}

/// Result of a conditional write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write happened; carries the revision now stored
    Applied(i64),
    /// The stored revision no longer matched the expected one
    Conflict,
}

impl Database {
    /// Opens (or creates) the database file and brings the schema up to
    /// date.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Whether the connection answers a trivial query.
    pub fn is_connected(&self) -> bool {
        self.connection
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .is_ok()
    }
}
