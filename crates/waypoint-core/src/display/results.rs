//! Result wrapper types for displaying operation outcomes.

use std::fmt;

use crate::models::{Plan, Step};

/// Wrapper type for displaying the result of create operations.
///
/// Prints a one-line confirmation with the new ID, then the resource.
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for CreateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created plan with ID: {}", self.resource.plan_id())?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for CreateResult<Step> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Created step with ID: {}", self.resource.step_id)?;
        writeln!(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, optionally
/// listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn fmt_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for UpdateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated plan {}", self.resource.plan_id())?;
        writeln!(f)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Step> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated step {}", self.resource.step_id)?;
        writeln!(f)?;
        self.fmt_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

/// Wrapper type for displaying the result of delete operations.
pub struct DeleteResult<T> {
    pub resource: T,
}

impl<T> DeleteResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

impl fmt::Display for DeleteResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted plan {} ({}) with {} steps",
            self.resource.plan_id(),
            self.resource.name(),
            self.resource.steps().len()
        )
    }
}

impl fmt::Display for DeleteResult<Step> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted step {} ({})",
            self.resource.step_id, self.resource.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::StepStatus,
        test_support::{plan, step},
    };

    #[test]
    fn test_update_result_lists_changes() {
        let result = UpdateResult::with_changes(
            step("a", 1, StepStatus::Completed, &[]),
            vec!["Status: completed".to_string()],
        );
        let text = result.to_string();
        assert!(text.starts_with("Updated step a\n"));
        assert!(text.contains("- Status: completed"));
    }

    #[test]
    fn test_delete_result_plan() {
        let plan = plan(vec![step("a", 1, StepStatus::Pending, &[])]);
        assert_eq!(
            DeleteResult::new(plan).to_string(),
            "Deleted plan plan-1 (Test Plan) with 1 steps\n"
        );
    }
}
