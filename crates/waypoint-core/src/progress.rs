//! Completion percentage and per-status step counts.

use serde::{Deserialize, Serialize};

use crate::models::{Plan, Step, StepStatus};

/// Number of steps in each status. Every status is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl StatusCounts {
    /// Counts the statuses of the given steps.
    pub fn of(steps: &[Step]) -> Self {
        steps.iter().fold(Self::default(), |mut counts, step| {
            *counts.slot(step.status) += 1;
            counts
        })
    }

    pub fn get(&self, status: StepStatus) -> usize {
        match status {
            StepStatus::Pending => self.pending,
            StepStatus::InProgress => self.in_progress,
            StepStatus::Completed => self.completed,
            StepStatus::Failed => self.failed,
            StepStatus::Skipped => self.skipped,
        }
    }

    /// Sum over all statuses.
    pub fn total(&self) -> usize {
        StepStatus::ALL.iter().map(|status| self.get(*status)).sum()
    }

    /// `(status, count)` pairs in lifecycle order.
    pub fn iter(&self) -> impl Iterator<Item = (StepStatus, usize)> + '_ {
        StepStatus::ALL
            .into_iter()
            .map(move |status| (status, self.get(status)))
    }

    fn slot(&mut self, status: StepStatus) -> &mut usize {
        match status {
            StepStatus::Pending => &mut self.pending,
            StepStatus::InProgress => &mut self.in_progress,
            StepStatus::Completed => &mut self.completed,
            StepStatus::Failed => &mut self.failed,
            StepStatus::Skipped => &mut self.skipped,
        }
    }
}

/// Progress report for one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub plan_id: String,
    pub total: usize,
    pub counts: StatusCounts,
    /// `100 * completed / total`, or 0 for a plan without steps
    pub percent_complete: f64,
}

/// Computes the progress of a plan in a single pass over its steps.
pub fn progress(plan: &Plan) -> Progress {
    let counts = StatusCounts::of(plan.steps());
    let total = plan.steps().len();
    Progress {
        plan_id: plan.plan_id().to_string(),
        total,
        counts,
        percent_complete: percent(counts.completed, total),
    }
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * part as f64 / total as f64
    }
}
