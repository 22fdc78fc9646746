//! Command definitions and their handlers.
//!
//! Each subcommand has a clap `Args` struct that converts into the matching
//! core parameter type, so core params stay free of clap attributes:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Planner
//! ```
//!
//! [`Cli`] runs the converted params against the planner and renders the
//! result as markdown.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use waypoint_core::{
    CreateResult, DeleteResult, OperationStatus, PlanStatus, Planner, StepStatus, UpdateResult,
    params::{
        AddStep, CreatePlan, DeletePlan, Id, ListPlans, NewStep, RegeneratePlan, StepRef,
        UpdatePlan, UpdateStep,
    },
};

use crate::renderer::TerminalRenderer;

// ============================================================================
// Plan commands
// ============================================================================

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a new plan with its initial steps
    Create(CreatePlanArgs),
    /// List plans, newest first
    List(ListPlansArgs),
    /// Show a plan with all of its steps
    Show(PlanIdArgs),
    /// Replace every step of a plan
    Regenerate(RegeneratePlanArgs),
    /// Change plan name, description, or pause state
    Update(UpdatePlanArgs),
    /// Put a plan on hold
    Pause(PlanIdArgs),
    /// Take a plan off hold
    Resume(PlanIdArgs),
    /// Return every step to pending
    Reset(PlanIdArgs),
    /// Permanently delete a plan
    Delete(DeletePlanArgs),
    /// Show completion percentage and status counts
    Progress(PlanIdArgs),
    /// Show a one-paragraph summary of a plan
    Summary(PlanIdArgs),
    /// Show the next step that can be worked on
    Next(PlanIdArgs),
}

/// Where a list of new steps comes from.
#[derive(Args)]
pub struct StepListArgs {
    /// Step description; repeat for several steps, in order
    #[arg(long = "step", value_name = "DESCRIPTION", conflicts_with = "steps_file")]
    pub steps: Vec<String>,

    /// JSON file holding an array of steps
    /// (`[{"step_id": "a", "description": "...", "depends_on": []}]`)
    #[arg(long, value_name = "FILE")]
    pub steps_file: Option<PathBuf>,
}

impl StepListArgs {
    fn into_steps(self) -> Result<Vec<NewStep>> {
        match self.steps_file {
            Some(path) => read_steps_file(&path),
            None => Ok(self.steps.into_iter().map(NewStep::described).collect()),
        }
    }
}

fn read_steps_file(path: &Path) -> Result<Vec<NewStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read steps file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse steps file {}", path.display()))
}

#[derive(Args)]
pub struct CreatePlanArgs {
    /// Name of the plan
    pub name: String,
    /// What the plan should accomplish
    #[arg(short, long)]
    pub description: String,
    #[command(flatten)]
    pub steps: StepListArgs,
}

#[derive(Args)]
pub struct ListPlansArgs {
    /// Only plans with this status
    #[arg(long)]
    pub status: Option<PlanStatus>,
    /// Only plans whose name contains this text
    #[arg(long)]
    pub name: Option<String>,
    /// Ignore --user and list plans of every user
    #[arg(long)]
    pub all_users: bool,
}

#[derive(Args)]
pub struct PlanIdArgs {
    /// ID of the plan
    pub id: String,
}

impl From<PlanIdArgs> for Id {
    fn from(val: PlanIdArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Args)]
pub struct RegeneratePlanArgs {
    /// ID of the plan to regenerate
    pub id: String,
    /// New description for the plan
    #[arg(short, long)]
    pub description: Option<String>,
    #[command(flatten)]
    pub steps: StepListArgs,
}

#[derive(Args)]
pub struct UpdatePlanArgs {
    /// ID of the plan to update
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Only `paused` is kept; any other value resumes the plan
    #[arg(long)]
    pub status: Option<PlanStatus>,
}

impl From<UpdatePlanArgs> for UpdatePlan {
    fn from(val: UpdatePlanArgs) -> Self {
        UpdatePlan {
            id: val.id,
            name: val.name,
            description: val.description,
            status: val.status,
        }
    }
}

#[derive(Args)]
pub struct DeletePlanArgs {
    /// ID of the plan to delete
    pub id: String,
    /// Confirm the deletion
    #[arg(long)]
    pub yes: bool,
}

impl From<DeletePlanArgs> for DeletePlan {
    fn from(val: DeletePlanArgs) -> Self {
        DeletePlan {
            id: val.id,
            confirmed: val.yes,
        }
    }
}

// ============================================================================
// Step commands
// ============================================================================

#[derive(Subcommand)]
pub enum StepCommands {
    /// Append a step to a plan
    Add(AddStepArgs),
    /// Change a step's status and/or notes
    Update(UpdateStepArgs),
    /// Show one step and what it is waiting on
    Show(StepRefArgs),
    /// Mark a step as skipped
    Skip(StepRefArgs),
    /// Remove a step from its plan
    Delete(StepRefArgs),
    /// List the steps of a plan in order
    List(PlanIdArgs),
}

#[derive(Args)]
pub struct AddStepArgs {
    /// ID of the plan to add the step to
    pub plan_id: String,
    /// What needs to be done
    pub description: String,
    /// ID for the new step; generated when omitted
    #[arg(long = "id")]
    pub step_id: Option<String>,
    /// Position of the step, starting at 1; defaults to after the last step
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub order: Option<u32>,
    /// ID of a step that must complete first; repeatable
    #[arg(long = "depends-on", value_name = "STEP_ID")]
    pub depends_on: Vec<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<AddStepArgs> for AddStep {
    fn from(val: AddStepArgs) -> Self {
        AddStep {
            plan_id: val.plan_id,
            step: NewStep {
                step_id: val.step_id,
                order: val.order,
                description: val.description,
                depends_on: val.depends_on,
                notes: val.notes,
            },
        }
    }
}

#[derive(Args)]
pub struct UpdateStepArgs {
    /// ID of the plan containing the step
    pub plan_id: String,
    /// ID of the step to update
    pub step_id: String,
    /// New status (pending, in_progress, completed, failed, skipped)
    #[arg(long)]
    pub status: Option<StepStatus>,
    /// New notes
    #[arg(long)]
    pub notes: Option<String>,
}

impl From<UpdateStepArgs> for UpdateStep {
    fn from(val: UpdateStepArgs) -> Self {
        UpdateStep {
            plan_id: val.plan_id,
            step_id: val.step_id,
            status: val.status,
            notes: val.notes,
        }
    }
}

#[derive(Args)]
pub struct StepRefArgs {
    /// ID of the plan containing the step
    pub plan_id: String,
    /// ID of the step
    pub step_id: String,
}

impl From<StepRefArgs> for StepRef {
    fn from(val: StepRefArgs) -> Self {
        StepRef {
            plan_id: val.plan_id,
            step_id: val.step_id,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Runs commands against the planner and renders their output.
pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
    user: Option<String>,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer, user: Option<String>) -> Self {
        Self {
            planner,
            renderer,
            user,
        }
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        match command {
            PlanCommands::Create(args) => self.create_plan(args).await,
            PlanCommands::List(args) => {
                let params = ListPlans {
                    user_id: if args.all_users {
                        None
                    } else {
                        self.user.clone()
                    },
                    status: args.status,
                    name: args.name,
                };
                self.list_plans(&params).await
            }
            PlanCommands::Show(args) => {
                let plan = self
                    .planner
                    .get_plan(&args.into())
                    .await
                    .context("Failed to show plan")?;
                self.renderer.render(&plan.to_string())
            }
            PlanCommands::Regenerate(args) => {
                let params = RegeneratePlan {
                    id: args.id,
                    description: args.description,
                    steps: args.steps.into_steps()?,
                };
                let plan = self
                    .planner
                    .regenerate_plan(&params)
                    .await
                    .context("Failed to regenerate plan")?;
                let changes = vec![format!("Replaced steps ({} now)", plan.steps().len())];
                self.renderer
                    .render(&UpdateResult::with_changes(plan, changes).to_string())
            }
            PlanCommands::Update(args) => {
                let plan = self
                    .planner
                    .update_plan(&args.into())
                    .await
                    .context("Failed to update plan")?;
                self.renderer.render(&UpdateResult::new(plan).to_string())
            }
            PlanCommands::Pause(args) => {
                let plan = self
                    .planner
                    .pause_plan(&args.into())
                    .await
                    .context("Failed to pause plan")?;
                self.render_status(format!("Plan {} is paused", plan.plan_id()))
            }
            PlanCommands::Resume(args) => {
                let plan = self
                    .planner
                    .resume_plan(&args.into())
                    .await
                    .context("Failed to resume plan")?;
                self.render_status(format!("Plan {} is {}", plan.plan_id(), plan.status()))
            }
            PlanCommands::Reset(args) => {
                let plan = self
                    .planner
                    .reset_plan(&args.into())
                    .await
                    .context("Failed to reset plan")?;
                let changes = vec!["All steps returned to pending".to_string()];
                self.renderer
                    .render(&UpdateResult::with_changes(plan, changes).to_string())
            }
            PlanCommands::Delete(args) => {
                let params = DeletePlan::from(args);
                if !params.confirmed {
                    bail!("Refusing to delete plan {} without --yes", params.id);
                }
                let plan = self
                    .planner
                    .delete_plan(&params)
                    .await
                    .context("Failed to delete plan")?;
                self.renderer.render(&DeleteResult::new(plan).to_string())
            }
            PlanCommands::Progress(args) => {
                let progress = self
                    .planner
                    .progress(&args.into())
                    .await
                    .context("Failed to compute progress")?;
                self.renderer.render(&progress.to_string())
            }
            PlanCommands::Summary(args) => {
                let summary = self
                    .planner
                    .summary(&args.into())
                    .await
                    .context("Failed to summarize plan")?;
                self.renderer.render(&summary.to_string())
            }
            PlanCommands::Next(args) => {
                let next = self
                    .planner
                    .next_step(&args.into())
                    .await
                    .context("Failed to find next step")?;
                self.renderer.render(&next.to_string())
            }
        }
    }

    pub async fn handle_step_command(&self, command: StepCommands) -> Result<()> {
        match command {
            StepCommands::Add(args) => {
                let step = self
                    .planner
                    .add_step(&args.into())
                    .await
                    .context("Failed to add step")?;
                self.renderer.render(&CreateResult::new(step).to_string())
            }
            StepCommands::Update(args) => {
                let params = UpdateStep::from(args);
                let mut changes = Vec::new();
                if let Some(status) = params.status {
                    changes.push(format!("Status: {status}"));
                }
                if params.notes.is_some() {
                    changes.push("Notes updated".to_string());
                }
                let step = self
                    .planner
                    .update_step(&params)
                    .await
                    .context("Failed to update step")?;
                self.renderer
                    .render(&UpdateResult::with_changes(step, changes).to_string())
            }
            StepCommands::Show(args) => {
                let (step, blockers) = self
                    .planner
                    .get_step_with_blockers(&args.into())
                    .await
                    .context("Failed to show step")?;
                let mut output = step.to_string();
                if step.is_pending() && !blockers.is_empty() {
                    output.push_str("#### Waiting on\n\n");
                    for blocker in &blockers {
                        output.push_str(&format!("- {blocker}\n"));
                    }
                }
                self.renderer.render(&output)
            }
            StepCommands::Skip(args) => {
                let step = self
                    .planner
                    .skip_step(&args.into())
                    .await
                    .context("Failed to skip step")?;
                self.renderer.render(&UpdateResult::new(step).to_string())
            }
            StepCommands::Delete(args) => {
                let step = self
                    .planner
                    .delete_step(&args.into())
                    .await
                    .context("Failed to delete step")?;
                self.renderer.render(&DeleteResult::new(step).to_string())
            }
            StepCommands::List(args) => {
                let steps = self
                    .planner
                    .list_steps(&args.into())
                    .await
                    .context("Failed to list steps")?;
                self.renderer.render(&steps.to_string())
            }
        }
    }

    pub async fn list_plans(&self, params: &ListPlans) -> Result<()> {
        let summaries = self
            .planner
            .list_plans_summary(params)
            .await
            .context("Failed to list plans")?;
        self.renderer.render(&summaries.to_string())
    }

    pub async fn health(&self) -> Result<()> {
        let health = self.planner.health().await;
        self.renderer.render(&health.to_string())?;
        if !health.database_connected {
            bail!(
                "Database at {} is unreachable",
                self.planner.database_path().display()
            );
        }
        Ok(())
    }

    async fn create_plan(&self, args: CreatePlanArgs) -> Result<()> {
        let Some(user_id) = self.user.clone() else {
            bail!("A user ID is required to create a plan (use --user or WAYPOINT_USER)");
        };
        let params = CreatePlan {
            name: args.name,
            description: args.description,
            user_id,
            steps: args.steps.into_steps()?,
        };
        let plan = self
            .planner
            .create_plan(&params)
            .await
            .context("Failed to create plan")?;
        self.renderer.render(&CreateResult::new(plan).to_string())
    }

    fn render_status(&self, message: String) -> Result<()> {
        self.renderer
            .render(&OperationStatus::success(message).to_string())
    }
}
