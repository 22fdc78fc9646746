//! Core library for the Waypoint plan tracker.
//!
//! A plan owns an ordered set of steps; steps may depend on other steps, and
//! the plan's status is always derived from its steps' statuses. The crate is
//! split into a pure core and the adapters around it:
//!
//! - **Pure core**: [`models`], [`derivation`], [`resolver`], [`progress`]
//!   and [`mutations`]. No I/O, no clock; time is passed in.
//! - **Storage**: [`db`] keeps one JSON document per plan in SQLite with a
//!   revision number for optimistic concurrency.
//! - **Async API**: [`planner`] wraps every mutation in a read-modify-write
//!   cycle that retries on revision conflicts.
//! - **Presentation**: [`display`] formats everything as markdown.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use waypoint_core::{
//!     PlannerBuilder,
//!     params::{CreatePlan, ListPlans, NewStep},
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path("test.db")
//!     .build()
//!     .await?;
//!
//! let plan = planner
//!     .create_plan(&CreatePlan {
//!         name: "My Project".to_string(),
//!         description: "A test project".to_string(),
//!         user_id: "alice".to_string(),
//!         steps: vec![
//!             NewStep::described("Draft design"),
//!             NewStep::described("Review design"),
//!         ],
//!     })
//!     .await?;
//! println!("Created plan: {plan}");
//!
//! let plans = planner.list_plans_summary(&ListPlans::default()).await?;
//! for plan in &plans {
//!     println!("Plan: {}", plan.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod db;
pub mod derivation;
pub mod display;
pub mod error;
pub mod models;
pub mod mutations;
pub mod params;
pub mod planner;
pub mod progress;
pub mod resolver;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use db::Database;
pub use derivation::derive_plan_status;
pub use display::{
    CreateResult, DeleteResult, LocalDateTime, OperationStatus, PlanSummaries, Steps,
    UpdateResult,
};
pub use error::{PlannerError, Result};
pub use models::{Plan, PlanFilter, PlanStatus, PlanSummary, Step, StepStatus};
pub use params::{
    AddStep, CreatePlan, DeletePlan, Id, ListPlans, NewStep, RegeneratePlan, StepRef, UpdatePlan,
    UpdateStep,
};
pub use planner::{Health, Planner, PlannerBuilder};
pub use progress::{Progress, StatusCounts, progress};
pub use resolver::{
    Blocker, NextAction, Satisfaction, dangling_dependencies, next_action, next_step,
};
