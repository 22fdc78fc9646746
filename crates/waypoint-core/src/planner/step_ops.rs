//! Step-level planner operations.
//!
//! Steps are always read and written as part of their plan document; these
//! methods load the plan, apply one transform, and hand back the affected
//! step.

use super::Planner;
use crate::{
    display::Steps,
    error::{PlannerError, Result},
    models::{Plan, Step},
    mutations,
    params::{AddStep, Id, StepRef, UpdateStep},
    resolver::{Blocker, blockers},
};

fn step_in(plan: &Plan, step_id: &str) -> Result<Step> {
    plan.step(step_id)
        .cloned()
        .ok_or_else(|| PlannerError::step_not_found(plan.plan_id(), step_id))
}

impl Planner {
    /// Appends a step to a plan and returns it.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` for invalid fields or a step ID
    /// already used in the plan, `PlannerError::PlanNotFound` if the plan
    /// does not exist.
    pub async fn add_step(&self, params: &AddStep) -> Result<Step> {
        params.step.validate()?;
        let new_step = params.step.clone();
        let (plan, step_id) = self
            .modify_plan(&params.plan_id, move |plan, now| {
                mutations::add_step(plan, &new_step, now)
            })
            .await?;
        step_in(&plan, &step_id)
    }

    /// Changes a step's status and/or notes and returns the updated step.
    pub async fn update_step(&self, params: &UpdateStep) -> Result<Step> {
        params.validate()?;
        let request = params.clone();
        let (plan, ()) = self
            .modify_plan(&params.plan_id, move |plan, now| {
                Ok((mutations::update_step(plan, &request, now)?, ()))
            })
            .await?;
        step_in(&plan, &params.step_id)
    }

    /// Marks a step as skipped and returns it.
    pub async fn skip_step(&self, params: &StepRef) -> Result<Step> {
        let step_id = params.step_id.clone();
        let (plan, ()) = self
            .modify_plan(&params.plan_id, move |plan, now| {
                Ok((mutations::skip_step(plan, &step_id, now)?, ()))
            })
            .await?;
        step_in(&plan, &params.step_id)
    }

    /// Removes a step from its plan and returns the removed step.
    ///
    /// Other steps that depend on it keep the reference and stay blocked.
    pub async fn delete_step(&self, params: &StepRef) -> Result<Step> {
        let step_id = params.step_id.clone();
        let (_, removed) = self
            .modify_plan(&params.plan_id, move |plan, now| {
                mutations::delete_step(plan, &step_id, now)
            })
            .await?;
        Ok(removed)
    }

    /// Retrieves one step.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` or `PlannerError::StepNotFound`.
    pub async fn get_step(&self, params: &StepRef) -> Result<Step> {
        let plan = self.load_plan(&params.plan_id).await?;
        step_in(&plan, &params.step_id)
    }

    /// Retrieves one step together with its unmet dependencies.
    pub async fn get_step_with_blockers(&self, params: &StepRef) -> Result<(Step, Vec<Blocker>)> {
        let plan = self.load_plan(&params.plan_id).await?;
        let step = step_in(&plan, &params.step_id)?;
        let unmet = blockers(&plan, &step);
        Ok((step, unmet))
    }

    /// All steps of a plan, sorted by order.
    pub async fn list_steps(&self, params: &Id) -> Result<Steps> {
        let plan = self.load_plan(&params.id).await?;
        Ok(Steps(plan.ordered_steps().into_iter().cloned().collect()))
    }
}
