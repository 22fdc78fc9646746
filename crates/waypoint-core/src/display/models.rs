//! Display implementations for domain models.
//!
//! Everything formats as markdown. Steps are shown in `order` whether they
//! are printed on their own or inside a plan.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::{
    models::{Plan, PlanStatus, PlanSummary, Step, StepStatus},
    planner::Health,
    progress::Progress,
    resolver::{Blocker, NextAction, Satisfaction, dangling_dependencies},
};

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}", self.name())?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.plan_id())?;
        writeln!(f, "- Status: {}", self.status())?;
        writeln!(f, "- Owner: {}", self.user_id())?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at()))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at()))?;
        let missing = dangling_dependencies(self);
        if !missing.is_empty() {
            writeln!(f, "- Missing dependencies: {}", missing.join(", "))?;
        }

        writeln!(f)?;
        writeln!(f, "{}", self.description())?;

        if self.steps().is_empty() {
            writeln!(f, "\nNo steps in this plan.")?;
        } else {
            writeln!(f, "\n## Steps")?;
            writeln!(f)?;
            for step in self.ordered_steps() {
                write!(f, "{step}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "### {}. {} ({})",
            self.order,
            self.description,
            self.status.with_icon()
        )?;
        writeln!(f)?;
        writeln!(f, "- ID: {}", self.step_id)?;

        if !self.depends_on.is_empty() {
            let deps: Vec<&str> = self.depends_on.iter().map(String::as_str).collect();
            writeln!(f, "- Depends on: {}", deps.join(", "))?;
        }
        if let Some(completed_at) = &self.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed_at))?;
        }
        writeln!(f)?;

        if let Some(notes) = &self.notes {
            writeln!(f, "{notes}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let progress = if self.total_steps > 0 {
            format!(" ({}/{})", self.completed_steps, self.total_steps)
        } else {
            String::new()
        };

        writeln!(f, "## {} (ID: {}){progress}", self.name, self.plan_id)?;
        writeln!(f)?;
        writeln!(f, "- **Status**: {}", self.status)?;
        writeln!(f, "- **Owner**: {}", self.user_id)?;
        writeln!(f, "- **Description**: {}", self.description)?;
        writeln!(f, "- **Pending steps**: {}", self.pending_steps)?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## Progress of plan {}", self.plan_id)?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Complete**: {:.2}% ({}/{})",
            self.percent_complete, self.counts.completed, self.total
        )?;
        for (status, count) in self.counts.iter() {
            writeln!(f, "- {}: {count}", status.with_icon())?;
        }
        Ok(())
    }
}

impl fmt::Display for Satisfaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Satisfaction::Satisfied => "satisfied",
            Satisfaction::Unsatisfied => "not completed yet",
            Satisfaction::Absent => "no such step",
        };
        write!(f, "{text}")
    }
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.step_id, self.satisfaction)
    }
}

impl fmt::Display for NextAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextAction::Ready(step) => {
                writeln!(f, "Next step:")?;
                writeln!(f)?;
                write!(f, "{step}")
            }
            NextAction::Blocked { pending } => writeln!(
                f,
                "No step is ready: {pending} pending step(s) are waiting on unmet dependencies."
            ),
            NextAction::Finished => writeln!(f, "No pending steps remain."),
        }
    }
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let database = if self.database_connected {
            "connected"
        } else {
            "unreachable"
        };
        writeln!(f, "- Database: {database}")?;
        writeln!(f, "- Checked: {}", LocalDateTime(&self.checked_at))
    }
}
