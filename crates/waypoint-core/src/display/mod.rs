//! Display formatting and result wrapper types.
//!
//! Domain models implement `Display` directly as markdown (see [`models`]);
//! the wrappers here add context for a particular operation or collection.
//! Both the terminal renderer and the MCP server print through these, so the
//! two interfaces show the same text.
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Collections &   │    │   Formatted     │
//! │  (Plan, Step)   │───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: Collection wrapper types (PlanSummaries, Steps)
//! - [`results`]: Operation result types (CreateResult, UpdateResult, DeleteResult)
//! - [`status`]: Status and confirmation messages (OperationStatus)
//! - [`datetime`]: Date/time formatting utilities
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use jiff::Timestamp;
//! use waypoint_core::{
//!     display::CreateResult,
//!     mutations,
//!     params::{CreatePlan, NewStep},
//! };
//!
//! let plan = mutations::create_plan(
//!     &CreatePlan {
//!         name: "New Project".to_string(),
//!         description: "A newly created project".to_string(),
//!         user_id: "alice".to_string(),
//!         steps: vec![NewStep::described("Kick-off")],
//!     },
//!     Timestamp::now(),
//! )
//! .unwrap();
//!
//! let output = CreateResult::new(plan).to_string();
//! assert!(output.starts_with("Created plan with ID: "));
//! assert!(output.contains("# New Project"));
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{PlanSummaries, Steps};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, DeleteResult, UpdateResult};
pub use status::OperationStatus;
