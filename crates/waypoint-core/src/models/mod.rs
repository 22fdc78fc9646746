//! Data models for plans and steps.
//!
//! A [`Plan`] owns its [`Step`]s outright: steps have no identity outside the
//! plan that contains them, and the whole plan is persisted as one document.
//! Display implementations live in [`crate::display::models`].
//!
//! `Plan` keeps its fields private so that its status can only change through
//! the mutation transforms in [`crate::mutations`], which re-derive it after
//! every step change.

pub mod filters;
pub mod plan;
pub mod status;
pub mod step;
pub mod summary;

pub use filters::PlanFilter;
pub use plan::Plan;
pub use status::{PlanStatus, StepStatus};
pub use step::Step;
pub use summary::PlanSummary;
