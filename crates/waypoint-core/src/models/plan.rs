//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::{PlanStatus, Step};
use crate::derivation::derive_plan_status;

/// Represents a complete plan document with its steps.
///
/// `status` has no public setter: it is recomputed from `steps` after every
/// step mutation, and only an explicit pause can put a different value there.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    plan_id: String,
    name: String,
    description: String,
    user_id: String,
    #[serde(default)]
    status: PlanStatus,
    created_at: Timestamp,
    updated_at: Timestamp,
    #[serde(default)]
    steps: Vec<Step>,
}

impl Plan {
    pub(crate) fn new(
        plan_id: String,
        name: String,
        description: String,
        user_id: String,
        steps: Vec<Step>,
        now: Timestamp,
    ) -> Self {
        let mut plan = Self {
            plan_id,
            name,
            description,
            user_id,
            status: PlanStatus::NotStarted,
            created_at: now,
            updated_at: now,
            steps,
        };
        plan.refresh_status();
        plan
    }

    /// Unique identifier for the plan
    pub fn plan_id(&self) -> &str {
        &self.plan_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Owner of the plan; fixed at creation
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> PlanStatus {
        self.status
    }

    pub fn is_paused(&self) -> bool {
        self.status == PlanStatus::Paused
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// Steps in storage order (the order they were added).
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Looks a step up by ID.
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|step| step.step_id == step_id)
    }

    /// Steps sorted by `order`, then `created_at`, then `step_id`.
    pub fn ordered_steps(&self) -> Vec<&Step> {
        let mut steps: Vec<&Step> = self.steps.iter().collect();
        steps.sort_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.step_id.cmp(&b.step_id))
        });
        steps
    }

    pub(crate) fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|step| step.step_id == step_id)
    }

    pub(crate) fn steps_mut(&mut self) -> &mut Vec<Step> {
        &mut self.steps
    }

    pub(crate) fn replace_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub(crate) fn set_description(&mut self, description: String) {
        self.description = description;
    }

    pub(crate) fn touch(&mut self, now: Timestamp) {
        self.updated_at = now;
    }

    pub(crate) fn pause(&mut self) {
        self.status = PlanStatus::Paused;
    }

    /// Re-derives `status` from the current steps, dropping any pause.
    pub(crate) fn refresh_status(&mut self) {
        self.status = derive_plan_status(&self.steps);
    }

    /// Brings a loaded document back in line with its steps. A stored pause
    /// is kept; any other stored status is replaced by the derived one.
    pub(crate) fn reconcile_status(&mut self) {
        if !self.is_paused() {
            self.refresh_status();
        }
    }
}
