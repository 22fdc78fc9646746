//! High-level planner API for managing plans and steps.
//!
//! The [`Planner`] is what the CLI and the MCP server talk to. Every method
//! runs its database work on a blocking thread with a fresh connection, and
//! every mutating method follows the same cycle:
//!
//! ```text
//! load plan @ revision N ──▶ pure transform (crate::mutations) ──▶ write if still N
//!          ▲                                                          │
//!          └────────────────────── conflict: reload ──────────────────┘
//! ```
//!
//! The transform is always rerun against the latest snapshot, never merged
//! into it. After `max_attempts` lost races the call fails with
//! [`PlannerError::RevisionConflict`].
//!
//! ## Submodules
//!
//! - [`builder`]: Factory for creating [`Planner`] instances with configuration
//! - [`plan_ops`]: Plan-level operations (create, list, regenerate, reset, ...)
//! - [`step_ops`]: Step-level operations (add, update, skip, delete, ...)
//!
//! # Usage Examples
//!
//! ```rust,no_run
//! use waypoint_core::{
//!     PlannerBuilder,
//!     params::{CreatePlan, Id, NewStep},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path("/tmp/waypoint.db")
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         name: "Release".to_string(),
//!         description: "Cut the 1.0 release".to_string(),
//!         user_id: "alice".to_string(),
//!         steps: vec![NewStep::described("Write changelog")],
//!     })
//!     .await?;
//!
//! let next = planner
//!     .next_step(&Id {
//!         id: plan.plan_id().to_string(),
//!     })
//!     .await?;
//! println!("{next}");
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use jiff::Timestamp;
use log::warn;
use serde::{Deserialize, Serialize};
use tokio::task;

use crate::{
    db::{Database, WriteOutcome},
    error::{PlannerError, Result},
    models::Plan,
};

pub mod builder;
pub mod plan_ops;
pub mod step_ops;

#[cfg(test)]
mod tests;

pub use builder::PlannerBuilder;

/// Default number of read-modify-write attempts per mutation.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Main planner interface for managing plans and steps.
#[derive(Debug, Clone)]
pub struct Planner {
    pub(crate) db_path: PathBuf,
    pub(crate) max_attempts: u32,
}

/// Result of a health check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub database_connected: bool,
    pub checked_at: Timestamp,
}

impl Planner {
    /// Creates a new planner with the specified database path.
    pub(crate) fn new(db_path: PathBuf, max_attempts: u32) -> Self {
        Self {
            db_path,
            max_attempts,
        }
    }

    /// Path of the SQLite file this planner uses.
    pub fn database_path(&self) -> &Path {
        &self.db_path
    }

    /// Reports whether the database can be opened and queried.
    pub async fn health(&self) -> Health {
        let db_path = self.db_path.clone();
        let database_connected = task::spawn_blocking(move || {
            Database::new(&db_path)
                .map(|db| db.is_connected())
                .unwrap_or(false)
        })
        .await
        .unwrap_or(false);

        Health {
            database_connected,
            checked_at: Timestamp::now(),
        }
    }

    /// Runs `f` on a blocking thread with a freshly opened database.
    pub(crate) async fn with_database<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            f(&mut db)
        })
        .await
        .map_err(PlannerError::join)?
    }

    /// Loads a plan or fails with `PlanNotFound`.
    pub(crate) async fn load_plan(&self, plan_id: &str) -> Result<Plan> {
        let plan_id = plan_id.to_string();
        self.with_database(move |db| {
            db.get_plan(&plan_id)?
                .map(|stored| stored.plan)
                .ok_or(PlannerError::PlanNotFound { id: plan_id })
        })
        .await
    }

    /// Applies `transform` to the latest snapshot of a plan and writes the
    /// result back, retrying from a fresh read when another writer got there
    /// first.
    ///
    /// The transform receives the snapshot and the current time, and may
    /// return an extra value alongside the new plan.
    pub(crate) async fn modify_plan<T, F>(&self, plan_id: &str, mut transform: F) -> Result<(Plan, T)>
    where
        T: Send + 'static,
        F: FnMut(Plan, Timestamp) -> Result<(Plan, T)> + Send + 'static,
    {
        let plan_id = plan_id.to_string();
        let max_attempts = self.max_attempts;
        self.with_database(move |db| {
            for attempt in 1..=max_attempts {
                let stored = db
                    .get_plan(&plan_id)?
                    .ok_or_else(|| PlannerError::PlanNotFound { id: plan_id.clone() })?;

                let (plan, extra) = transform(stored.plan, Timestamp::now())?;
                match db.update_plan(&plan, stored.revision)? {
                    WriteOutcome::Applied(_) => return Ok((plan, extra)),
                    WriteOutcome::Conflict => warn!(
                        "Plan {plan_id} changed since revision {} (attempt {attempt}/{max_attempts})",
                        stored.revision
                    ),
                }
            }

            Err(PlannerError::RevisionConflict {
                id: plan_id,
                attempts: max_attempts,
            })
        })
        .await
    }
}
