//! Plan-level planner operations.

use jiff::Timestamp;
use log::{info, warn};

use super::Planner;
use crate::{
    db::WriteOutcome,
    display::PlanSummaries,
    error::{PlannerError, Result},
    models::{Plan, PlanFilter, PlanSummary},
    mutations,
    params::{CreatePlan, DeletePlan, Id, ListPlans, RegeneratePlan, UpdatePlan},
    progress::{Progress, progress},
    resolver::{NextAction, next_action},
};

impl Planner {
    /// Creates a new plan with its initial steps.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` if the request is malformed;
    /// nothing is written in that case.
    pub async fn create_plan(&self, params: &CreatePlan) -> Result<Plan> {
        let plan = mutations::create_plan(params, Timestamp::now())?;

        let stored = plan.clone();
        self.with_database(move |db| db.insert_plan(&stored)).await?;

        info!(
            "Created plan {} for user {} with {} steps",
            plan.plan_id(),
            plan.user_id(),
            plan.steps().len()
        );
        Ok(plan)
    }

    /// Retrieves a plan with all of its steps.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` if no plan has this ID.
    pub async fn get_plan(&self, params: &Id) -> Result<Plan> {
        self.load_plan(&params.id).await
    }

    /// Lists plans matching the parameters, newest first.
    pub async fn list_plans(&self, params: &ListPlans) -> Result<Vec<Plan>> {
        let filter = PlanFilter::from(params);
        self.with_database(move |db| db.list_plans(&filter)).await
    }

    /// Lists plans as summaries with step counts, newest first.
    pub async fn list_plans_summary(&self, params: &ListPlans) -> Result<PlanSummaries> {
        let plans = self.list_plans(params).await?;
        Ok(PlanSummaries(plans.iter().map(PlanSummary::from).collect()))
    }

    /// Replaces every step of a plan and optionally its description.
    pub async fn regenerate_plan(&self, params: &RegeneratePlan) -> Result<Plan> {
        params.validate()?;
        let request = params.clone();
        let (plan, ()) = self
            .modify_plan(&params.id, move |plan, now| {
                Ok((mutations::regenerate_plan(plan, &request, now)?, ()))
            })
            .await?;
        Ok(plan)
    }

    /// Updates plan name, description, or pause state.
    pub async fn update_plan(&self, params: &UpdatePlan) -> Result<Plan> {
        params.validate()?;
        let request = params.clone();
        let (plan, ()) = self
            .modify_plan(&params.id, move |plan, now| {
                Ok((mutations::update_plan(plan, &request, now)?, ()))
            })
            .await?;
        Ok(plan)
    }

    /// Pauses a plan until the next step change or [`Planner::resume_plan`].
    pub async fn pause_plan(&self, params: &Id) -> Result<Plan> {
        let (plan, ()) = self
            .modify_plan(&params.id, |plan, now| {
                Ok((mutations::pause_plan(plan, now), ()))
            })
            .await?;
        Ok(plan)
    }

    /// Clears a pause, deriving the status from the steps again.
    pub async fn resume_plan(&self, params: &Id) -> Result<Plan> {
        let (plan, ()) = self
            .modify_plan(&params.id, |plan, now| {
                Ok((mutations::resume_plan(plan, now), ()))
            })
            .await?;
        Ok(plan)
    }

    /// Returns every step of a plan to `pending`.
    pub async fn reset_plan(&self, params: &Id) -> Result<Plan> {
        let (plan, ()) = self
            .modify_plan(&params.id, |plan, now| {
                Ok((mutations::reset_plan(plan, now), ()))
            })
            .await?;
        Ok(plan)
    }

    /// Permanently deletes a plan and returns it.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::Validation` unless `confirmed` is set, and
    /// `PlannerError::PlanNotFound` if no plan has this ID.
    pub async fn delete_plan(&self, params: &DeletePlan) -> Result<Plan> {
        if !params.confirmed {
            return Err(PlannerError::validation("confirmed")
                .with_reason("deletion is permanent and must be confirmed"));
        }

        let plan_id = params.id.clone();
        let max_attempts = self.max_attempts;
        let plan = self
            .with_database(move |db| {
                for attempt in 1..=max_attempts {
                    let stored = db
                        .get_plan(&plan_id)?
                        .ok_or_else(|| PlannerError::PlanNotFound {
                            id: plan_id.clone(),
                        })?;
                    match db.delete_plan(&plan_id, stored.revision)? {
                        WriteOutcome::Applied(_) => return Ok(stored.plan),
                        WriteOutcome::Conflict => warn!(
                            "Plan {plan_id} changed before it could be deleted (attempt {attempt}/{max_attempts})"
                        ),
                    }
                }
                Err(PlannerError::RevisionConflict {
                    id: plan_id,
                    attempts: max_attempts,
                })
            })
            .await?;

        info!("Deleted plan {}", plan.plan_id());
        Ok(plan)
    }

    /// Completion percentage and per-status counts for a plan.
    pub async fn progress(&self, params: &Id) -> Result<Progress> {
        let plan = self.load_plan(&params.id).await?;
        Ok(progress(&plan))
    }

    /// Summary of a single plan.
    pub async fn summary(&self, params: &Id) -> Result<PlanSummary> {
        let plan = self.load_plan(&params.id).await?;
        Ok(PlanSummary::from(&plan))
    }

    /// The next actionable step, or why there is none.
    pub async fn next_step(&self, params: &Id) -> Result<NextAction> {
        let plan = self.load_plan(&params.id).await?;
        Ok(next_action(&plan))
    }
}
