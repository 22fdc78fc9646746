//! Plan mutation transforms.
//!
//! Every operation takes a plan snapshot by value and returns the updated
//! plan, with the current time passed in by the caller. Nothing here touches
//! storage, so the planner can rerun a transform against a freshly loaded
//! snapshot when its conditional write loses a race.
//!
//! Input is validated before the snapshot is touched, and every operation
//! that changes steps re-derives the plan status before returning.

use jiff::Timestamp;
use log::debug;
use uuid::Uuid;

use crate::{
    error::{PlannerError, Result},
    models::{Plan, PlanStatus, Step},
    params::{CreatePlan, NewStep, RegeneratePlan, UpdatePlan, UpdateStep},
};

fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

fn build_step(new_step: &NewStep, default_order: u32, now: Timestamp) -> Step {
    Step::new(
        new_step
            .trimmed_step_id()
            .map_or_else(generate_id, str::to_string),
        new_step.order.unwrap_or(default_order),
        new_step.description.trim().to_string(),
        new_step
            .depends_on
            .iter()
            .map(|dep| dep.trim().to_string())
            .collect(),
        new_step.notes.clone(),
        now,
    )
}

/// Builds steps from a request list. Omitted orders take the 1-based list
/// position.
fn build_steps(new_steps: &[NewStep], now: Timestamp) -> Vec<Step> {
    new_steps
        .iter()
        .zip(1u32..)
        .map(|(new_step, position)| build_step(new_step, position, now))
        .collect()
}

fn find_step_mut<'a>(plan: &'a mut Plan, step_id: &str) -> Result<&'a mut Step> {
    let plan_id = plan.plan_id().to_string();
    plan.step_mut(step_id)
        .ok_or_else(|| PlannerError::step_not_found(&plan_id, step_id))
}

/// Creates a plan and its full initial step list in one go.
///
/// # Errors
///
/// Returns `PlannerError::Validation` for an empty step list, an empty
/// description, a self-dependency, or a duplicate step ID.
pub fn create_plan(params: &CreatePlan, now: Timestamp) -> Result<Plan> {
    params.validate()?;

    let plan = Plan::new(
        generate_id(),
        params.name.trim().to_string(),
        params.description.trim().to_string(),
        params.user_id.trim().to_string(),
        build_steps(&params.steps, now),
        now,
    );
    debug!(
        "Built plan {} with {} steps",
        plan.plan_id(),
        plan.steps().len()
    );
    Ok(plan)
}

/// Replaces every step of the plan and optionally its description.
///
/// ID, owner and creation time are kept.
///
/// # Errors
///
/// Same validation as [`create_plan`].
pub fn regenerate_plan(mut plan: Plan, params: &RegeneratePlan, now: Timestamp) -> Result<Plan> {
    params.validate()?;

    if let Some(description) = &params.description {
        plan.set_description(description.trim().to_string());
    }
    plan.replace_steps(build_steps(&params.steps, now));
    plan.refresh_status();
    plan.touch(now);
    debug!(
        "Regenerated plan {} with {} steps",
        plan.plan_id(),
        plan.steps().len()
    );
    Ok(plan)
}

/// Applies a new status and/or notes to one step.
///
/// # Errors
///
/// Returns `PlannerError::StepNotFound` if the step is not in the plan, or
/// `PlannerError::Validation` for a request that changes nothing.
pub fn update_step(mut plan: Plan, params: &UpdateStep, now: Timestamp) -> Result<Plan> {
    params.validate()?;

    let step = find_step_mut(&mut plan, &params.step_id)?;
    if let Some(status) = params.status {
        step.set_status(status, now);
    }
    if let Some(notes) = &params.notes {
        step.set_notes(notes.clone(), now);
    }

    plan.refresh_status();
    plan.touch(now);
    debug!(
        "Updated step {} in plan {}; plan is now {}",
        params.step_id,
        plan.plan_id(),
        plan.status()
    );
    Ok(plan)
}

/// Appends a step to the plan and returns its ID.
///
/// `depends_on` may name steps that do not exist (yet). An omitted order
/// becomes one past the highest existing order.
///
/// # Errors
///
/// Returns `PlannerError::Validation` for invalid fields or a step ID that
/// is already taken in this plan.
pub fn add_step(mut plan: Plan, new_step: &NewStep, now: Timestamp) -> Result<(Plan, String)> {
    new_step.validate()?;

    if let Some(step_id) = new_step.trimmed_step_id()
        && plan.step(step_id).is_some()
    {
        return Err(PlannerError::validation("step_id").with_reason(format!(
            "step {step_id} already exists in plan {}",
            plan.plan_id()
        )));
    }

    let next_order = plan
        .steps()
        .iter()
        .map(|step| step.order)
        .max()
        .map_or(1, |order| order.saturating_add(1));
    let step = build_step(new_step, next_order, now);
    let step_id = step.step_id.clone();

    plan.steps_mut().push(step);
    plan.refresh_status();
    plan.touch(now);
    debug!("Added step {step_id} to plan {}", plan.plan_id());
    Ok((plan, step_id))
}

/// Removes a step and returns it alongside the updated plan.
///
/// References to the removed step in other steps' `depends_on` are left in
/// place and from then on count as absent.
///
/// # Errors
///
/// Returns `PlannerError::StepNotFound` if the step is not in the plan.
pub fn delete_step(mut plan: Plan, step_id: &str, now: Timestamp) -> Result<(Plan, Step)> {
    let position = plan
        .steps()
        .iter()
        .position(|step| step.step_id == step_id)
        .ok_or_else(|| PlannerError::step_not_found(plan.plan_id(), step_id))?;

    let removed = plan.steps_mut().remove(position);
    plan.refresh_status();
    plan.touch(now);
    debug!("Deleted step {step_id} from plan {}", plan.plan_id());
    Ok((plan, removed))
}

/// Forces a step to `skipped`, whatever its status or dependencies.
///
/// # Errors
///
/// Returns `PlannerError::StepNotFound` if the step is not in the plan.
pub fn skip_step(mut plan: Plan, step_id: &str, now: Timestamp) -> Result<Plan> {
    find_step_mut(&mut plan, step_id)?.skip(now);
    plan.refresh_status();
    plan.touch(now);
    debug!("Skipped step {step_id} in plan {}", plan.plan_id());
    Ok(plan)
}

/// Returns every step to `pending` and clears completion timestamps.
///
/// Steps that are already pending are left untouched, so resetting twice
/// gives the same plan as resetting once.
pub fn reset_plan(mut plan: Plan, now: Timestamp) -> Plan {
    let mut changed = 0usize;
    for step in plan.steps_mut() {
        if step.reset(now) {
            changed += 1;
        }
    }

    let was_paused = plan.is_paused();
    plan.refresh_status();
    if changed > 0 || was_paused {
        plan.touch(now);
    }
    debug!("Reset {changed} steps in plan {}", plan.plan_id());
    plan
}

/// Updates plan metadata.
///
/// A requested status of `paused` pauses the plan. Any other requested
/// status is not stored: it clears a pause and the status is derived again.
///
/// # Errors
///
/// Returns `PlannerError::Validation` for empty or oversized text.
pub fn update_plan(mut plan: Plan, params: &UpdatePlan, now: Timestamp) -> Result<Plan> {
    params.validate()?;

    if let Some(name) = &params.name {
        plan.set_name(name.trim().to_string());
    }
    if let Some(description) = &params.description {
        plan.set_description(description.trim().to_string());
    }
    match params.status {
        Some(PlanStatus::Paused) => plan.pause(),
        Some(_) => plan.refresh_status(),
        None => {}
    }

    plan.touch(now);
    debug!("Updated plan {}", plan.plan_id());
    Ok(plan)
}

/// Puts the plan on hold until the next step mutation or resume.
pub fn pause_plan(mut plan: Plan, now: Timestamp) -> Plan {
    if !plan.is_paused() {
        plan.pause();
        plan.touch(now);
    }
    plan
}

/// Clears a pause by deriving the status from the steps again.
pub fn resume_plan(mut plan: Plan, now: Timestamp) -> Plan {
    if plan.is_paused() {
        plan.refresh_status();
        plan.touch(now);
    }
    plan
}
