//! Plan summary types and functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{Plan, PlanStatus, StepStatus};

/// Summary information about a plan with step statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub plan_id: String,
    pub name: String,
    pub description: String,
    pub status: PlanStatus,
    pub user_id: String,
    /// Total number of steps
    pub total_steps: usize,
    /// Number of completed steps
    pub completed_steps: usize,
    /// Number of steps still in `pending`
    pub pending_steps: usize,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let count = |status: StepStatus| {
            plan.steps()
                .iter()
                .filter(|step| step.status == status)
                .count()
        };

        Self {
            plan_id: plan.plan_id().to_string(),
            name: plan.name().to_string(),
            description: plan.description().to_string(),
            status: plan.status(),
            user_id: plan.user_id().to_string(),
            total_steps: plan.steps().len(),
            completed_steps: count(StepStatus::Completed),
            pending_steps: count(StepStatus::Pending),
            created_at: plan.created_at(),
            updated_at: plan.updated_at(),
        }
    }
}
