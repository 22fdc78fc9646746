//! Parameter structures for waypoint operations
//!
//! These structures are shared by every interface (CLI, MCP, tests) and carry
//! no framework-specific derives beyond serde and the optional JSON schema.
//! Interface layers wrap or convert into them; the planner and the mutation
//! transforms only ever see these types.
//!
//! Each request type has a `validate()` that checks field shapes (non-empty
//! text, length limits, dependency IDs). Validation runs before any mutation
//! is applied, so a rejected request never leaves a partial write behind.

#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{PlannerError, Result},
    models::{PlanStatus, StepStatus},
};

pub const MAX_PLAN_NAME_LEN: usize = 200;
pub const MAX_PLAN_DESCRIPTION_LEN: usize = 1000;
pub const MAX_USER_ID_LEN: usize = 100;
pub const MAX_STEP_DESCRIPTION_LEN: usize = 500;
pub const MAX_NOTES_LEN: usize = 500;

fn require_text(field: &str, value: &str, max: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlannerError::validation(field).with_reason("must not be empty"));
    }
    limit_text(field, value, max)
}

fn limit_text(field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(PlannerError::validation(field)
            .with_reason(format!("must be at most {max} characters (got {len})")));
    }
    Ok(())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> Result<()> {
    value.map_or(Ok(()), |value| limit_text(field, value, max))
}

/// Generic parameters for operations requiring just a plan ID.
///
/// Used for show, reset, pause, resume, progress, summary and next-step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    /// The ID of the plan to operate on
    pub id: String,
}

/// Identifies one step inside one plan.
///
/// Used for show, skip and delete step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct StepRef {
    /// ID of the plan containing the step
    pub plan_id: String,
    /// ID of the step
    pub step_id: String,
}

/// A step as supplied by the caller, before it gets an ID and timestamps.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewStep {
    /// Optional caller-chosen ID, so sibling steps can depend on it.
    /// Generated when omitted.
    #[serde(default)]
    pub step_id: Option<String>,
    /// Position of the step; defaulted when omitted
    #[serde(default)]
    pub order: Option<u32>,
    /// What needs to be done (required)
    pub description: String,
    /// IDs of steps that must complete first
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Optional notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewStep {
    /// Convenience constructor for a step with only a description.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// The caller-supplied ID without surrounding whitespace.
    pub fn trimmed_step_id(&self) -> Option<&str> {
        self.step_id.as_deref().map(str::trim)
    }

    /// Checks field shapes, including that the step does not depend on its
    /// own caller-supplied ID.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        require_text("description", &self.description, MAX_STEP_DESCRIPTION_LEN)?;
        optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)?;

        if self.order == Some(0) {
            return Err(PlannerError::validation("order").with_reason("must be at least 1"));
        }

        if let Some(step_id) = &self.step_id
            && step_id.trim().is_empty()
        {
            return Err(PlannerError::validation("step_id").with_reason("must not be empty"));
        }

        if self.depends_on.iter().any(|dep| dep.trim().is_empty()) {
            return Err(PlannerError::validation("depends_on")
                .with_reason("dependency IDs must not be empty"));
        }

        if let Some(step_id) = self.trimmed_step_id()
            && self.depends_on.iter().any(|dep| dep.trim() == step_id)
        {
            return Err(PlannerError::validation("depends_on")
                .with_reason(format!("step {step_id} cannot depend on itself")));
        }

        Ok(())
    }
}

fn validate_step_list(steps: &[NewStep]) -> Result<()> {
    if steps.is_empty() {
        return Err(PlannerError::validation("steps").with_reason("must contain at least one step"));
    }

    let mut seen = std::collections::HashSet::new();
    for step in steps {
        step.validate()?;
        if let Some(step_id) = step.trimmed_step_id()
            && !seen.insert(step_id)
        {
            return Err(PlannerError::validation("step_id")
                .with_reason(format!("duplicate step ID {step_id}")));
        }
    }
    Ok(())
}

/// Parameters for creating a new plan with its full initial step list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlan {
    /// Name of the plan (required)
    pub name: String,
    /// What the plan should accomplish (required)
    pub description: String,
    /// Owner of the plan (required)
    pub user_id: String,
    /// Initial steps, at least one
    pub steps: Vec<NewStep>,
}

impl CreatePlan {
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` for an empty step list, empty or
    /// oversized text, or a self-dependency.
    pub fn validate(&self) -> Result<()> {
        require_text("name", &self.name, MAX_PLAN_NAME_LEN)?;
        require_text("description", &self.description, MAX_PLAN_DESCRIPTION_LEN)?;
        require_text("user_id", &self.user_id, MAX_USER_ID_LEN)?;
        validate_step_list(&self.steps)
    }
}

/// Parameters for replacing every step of a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegeneratePlan {
    /// ID of the plan to regenerate
    pub id: String,
    /// Optional replacement description
    #[serde(default)]
    pub description: Option<String>,
    /// The new steps, at least one
    pub steps: Vec<NewStep>,
}

impl RegeneratePlan {
    /// # Errors
    ///
    /// Same rules as [`CreatePlan::validate`].
    pub fn validate(&self) -> Result<()> {
        if let Some(description) = &self.description {
            require_text("description", description, MAX_PLAN_DESCRIPTION_LEN)?;
        }
        validate_step_list(&self.steps)
    }
}

/// Parameters for updating plan metadata.
///
/// `status` is only honored when it is `paused`; any other value clears a
/// pause and the status is derived from the steps again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdatePlan {
    /// ID of the plan to update
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<PlanStatus>,
}

impl UpdatePlan {
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` for empty or oversized text.
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_text("name", name, MAX_PLAN_NAME_LEN)?;
        }
        if let Some(description) = &self.description {
            require_text("description", description, MAX_PLAN_DESCRIPTION_LEN)?;
        }
        Ok(())
    }
}

/// Parameters for adding one step to an existing plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddStep {
    /// ID of the plan to add the step to
    pub plan_id: String,
    /// The step to add; `depends_on` may reference steps that do not exist yet
    #[serde(flatten)]
    pub step: NewStep,
}

/// Parameters for changing a step's status and/or notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateStep {
    /// ID of the plan containing the step
    pub plan_id: String,
    /// ID of the step to update
    pub step_id: String,
    /// New status
    #[serde(default)]
    pub status: Option<StepStatus>,
    /// New notes
    #[serde(default)]
    pub notes: Option<String>,
}

impl UpdateStep {
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` for oversized notes or a request
    /// that changes nothing.
    pub fn validate(&self) -> Result<()> {
        if self.status.is_none() && self.notes.is_none() {
            return Err(PlannerError::validation("status")
                .with_reason("provide a status, notes, or both"));
        }
        optional_text("notes", self.notes.as_deref(), MAX_NOTES_LEN)
    }
}

/// Parameters for listing plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPlans {
    /// Only plans owned by this user
    #[serde(default)]
    pub user_id: Option<String>,
    /// Only plans with this status
    #[serde(default)]
    pub status: Option<PlanStatus>,
    /// Only plans whose name contains this text (case-insensitive)
    #[serde(default)]
    pub name: Option<String>,
}

/// Parameters for permanently deleting a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DeletePlan {
    /// The ID of the plan to delete
    pub id: String,
    /// Must be true; deletion cannot be undone
    #[serde(default)]
    pub confirmed: bool,
}
