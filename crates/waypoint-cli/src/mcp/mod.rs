//! MCP server implementation for Waypoint
//!
//! Exposes the planner as Model Context Protocol tools over stdio. Tool
//! parameters are the core parameter types themselves (with their JSON
//! schemas enabled through the core `schema` feature), and every tool
//! answers with the same markdown the CLI prints.

use std::sync::Arc;

use anyhow::Result;
use log::{debug, error, info};
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use tokio::signal::unix::{SignalKind, signal};
use waypoint_core::{
    CreateResult, DeleteResult, OperationStatus, Planner, UpdateResult,
    params::{
        AddStep, CreatePlan, DeletePlan, Id, ListPlans, RegeneratePlan, StepRef, UpdatePlan,
        UpdateStep,
    },
};

pub mod errors;

use errors::to_mcp_error;

pub type McpResult = Result<CallToolResult, McpError>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

const INSTRUCTIONS: &str = r#"Waypoint tracks plans made of ordered steps. A plan's status is always derived from its steps, so you never set it directly (except to pause a plan).

## Core Concepts
- **Plans**: a name, a description, an owner (user_id) and an ordered list of steps
- **Steps**: a description, a status (pending, in_progress, completed, failed, skipped), optional notes, and optional `depends_on` links to other steps in the same plan
- **Plan status**: not_started, in_progress, completed, failed (any step failed), or paused

## Workflow
1. Create a plan with `create_plan`, giving every step up front. Give steps a `step_id` if other steps should depend on them.
2. Call `next_step` to get the lowest-ordered pending step whose dependencies are all completed.
3. Report work with `update_step` (status and/or notes).
4. Check `plan_progress` or `plan_summary` at any time.

## Blocked plans
A dependency on a step that is missing or not completed keeps a step from being picked. `next_step` says so when pending steps remain but none is ready; `show_step` lists what a step is waiting on. Skipped steps do not satisfy dependencies."#;

/// MCP server for Waypoint
#[derive(Clone)]
pub struct WaypointMcpServer {
    planner: Arc<Planner>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl WaypointMcpServer {
    pub fn new(planner: Planner) -> Self {
        Self {
            planner: Arc::new(planner),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        name = "create_plan",
        description = "Create a plan together with its complete initial step list. Requires name, description, user_id and at least one step. Steps may carry their own step_id so that later steps can list them in depends_on. Returns the plan with its new ID."
    )]
    async fn create_plan(&self, Parameters(params): Parameters<CreatePlan>) -> McpResult {
        debug!("create_plan: {params:?}");
        let plan = self
            .planner
            .create_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to create plan", &e))?;
        text(CreateResult::new(plan))
    }

    #[tool(
        name = "list_plans",
        description = "List plans newest first, optionally filtered by user_id, status, or a case-insensitive name fragment. Returns summaries with completed/total step counts."
    )]
    async fn list_plans(&self, Parameters(params): Parameters<ListPlans>) -> McpResult {
        let summaries = self
            .planner
            .list_plans_summary(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to list plans", &e))?;
        text(summaries)
    }

    #[tool(
        name = "show_plan",
        description = "Show a plan with all of its steps in order, including statuses, dependencies and notes."
    )]
    async fn show_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let plan = self
            .planner
            .get_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to show plan", &e))?;
        text(plan)
    }

    #[tool(
        name = "regenerate_plan",
        description = "Replace every step of a plan with a new list, optionally updating the description. The plan ID, owner and creation time are kept; all progress on the old steps is discarded."
    )]
    async fn regenerate_plan(&self, Parameters(params): Parameters<RegeneratePlan>) -> McpResult {
        let plan = self
            .planner
            .regenerate_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to regenerate plan", &e))?;
        text(UpdateResult::new(plan))
    }

    #[tool(
        name = "update_plan",
        description = "Change a plan's name and/or description. Pass status='paused' to pause the plan; any other status value clears a pause. The owner cannot be changed."
    )]
    async fn update_plan(&self, Parameters(params): Parameters<UpdatePlan>) -> McpResult {
        let plan = self
            .planner
            .update_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to update plan", &e))?;
        text(UpdateResult::new(plan))
    }

    #[tool(
        name = "pause_plan",
        description = "Pause a plan. It stays paused until a step changes or resume_plan is called."
    )]
    async fn pause_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let plan = self
            .planner
            .pause_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to pause plan", &e))?;
        text(OperationStatus::success(format!(
            "Plan {} is paused",
            plan.plan_id()
        )))
    }

    #[tool(
        name = "resume_plan",
        description = "Resume a paused plan; its status is derived from its steps again."
    )]
    async fn resume_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let plan = self
            .planner
            .resume_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to resume plan", &e))?;
        text(OperationStatus::success(format!(
            "Plan {} is {}",
            plan.plan_id(),
            plan.status()
        )))
    }

    #[tool(
        name = "reset_plan",
        description = "Return every step of a plan to pending and clear completion times. The plan becomes not_started."
    )]
    async fn reset_plan(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let plan = self
            .planner
            .reset_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to reset plan", &e))?;
        text(UpdateResult::new(plan))
    }

    #[tool(
        name = "delete_plan",
        description = "Permanently delete a plan and all its steps. Requires confirmed=true. This cannot be undone."
    )]
    async fn delete_plan(&self, Parameters(params): Parameters<DeletePlan>) -> McpResult {
        let plan = self
            .planner
            .delete_plan(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to delete plan", &e))?;
        text(DeleteResult::new(plan))
    }

    #[tool(
        name = "plan_progress",
        description = "Completion percentage of a plan plus the number of steps in each status."
    )]
    async fn plan_progress(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let progress = self
            .planner
            .progress(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to compute progress", &e))?;
        text(progress)
    }

    #[tool(
        name = "plan_summary",
        description = "Short summary of a plan: status, owner, and completed/total/pending step counts."
    )]
    async fn plan_summary(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let summary = self
            .planner
            .summary(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to summarize plan", &e))?;
        text(summary)
    }

    #[tool(
        name = "next_step",
        description = "The pending step with the lowest order whose dependencies are all completed. If there is none, says whether the plan is finished or blocked on unmet dependencies."
    )]
    async fn next_step(&self, Parameters(params): Parameters<Id>) -> McpResult {
        let next = self
            .planner
            .next_step(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to find next step", &e))?;
        text(next)
    }

    #[tool(
        name = "add_step",
        description = "Append a step to a plan. Requires plan_id and description; step_id, order, depends_on and notes are optional. depends_on may name steps that do not exist yet."
    )]
    async fn add_step(&self, Parameters(params): Parameters<AddStep>) -> McpResult {
        let step = self
            .planner
            .add_step(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to add step", &e))?;
        text(CreateResult::new(step))
    }

    #[tool(
        name = "update_step",
        description = "Change a step's status (pending, in_progress, completed, failed, skipped) and/or notes. The plan status is re-derived afterwards."
    )]
    async fn update_step(&self, Parameters(params): Parameters<UpdateStep>) -> McpResult {
        let step = self
            .planner
            .update_step(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to update step", &e))?;
        text(UpdateResult::new(step))
    }

    #[tool(
        name = "show_step",
        description = "Show one step and list any dependencies it is still waiting on."
    )]
    async fn show_step(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        let (step, blockers) = self
            .planner
            .get_step_with_blockers(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to show step", &e))?;

        let mut output = step.to_string();
        if step.is_pending() && !blockers.is_empty() {
            output.push_str("#### Waiting on\n\n");
            for blocker in &blockers {
                output.push_str(&format!("- {blocker}\n"));
            }
        }
        text(output)
    }

    #[tool(
        name = "skip_step",
        description = "Mark a step as skipped regardless of its status or dependencies. Skipped steps do not satisfy other steps' dependencies."
    )]
    async fn skip_step(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        let step = self
            .planner
            .skip_step(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to skip step", &e))?;
        text(UpdateResult::new(step))
    }

    #[tool(
        name = "delete_step",
        description = "Remove a step from its plan. Steps that depended on it keep the reference and stay blocked."
    )]
    async fn delete_step(&self, Parameters(params): Parameters<StepRef>) -> McpResult {
        let step = self
            .planner
            .delete_step(&params)
            .await
            .map_err(|e| to_mcp_error("Failed to delete step", &e))?;
        text(DeleteResult::new(step))
    }

    #[tool(
        name = "health",
        description = "Report whether the plan database is reachable."
    )]
    async fn health(&self) -> McpResult {
        text(self.planner.health().await)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for WaypointMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "waypoint".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: WaypointMcpServer) -> Result<()> {
    use rmcp::{ServiceExt, transport::stdio};

    info!("Starting Waypoint MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;
    use waypoint_core::PlannerBuilder;

    use super::*;

    async fn server() -> (TempDir, WaypointMcpServer) {
        let dir = TempDir::new().unwrap();
        let planner = PlannerBuilder::new()
            .with_database_path(dir.path().join("mcp.db"))
            .build()
            .await
            .unwrap();
        (dir, WaypointMcpServer::new(planner))
    }

    #[tokio::test]
    async fn test_every_operation_is_a_tool() {
        let (_dir, server) = server().await;
        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();

        for expected in [
            "create_plan",
            "list_plans",
            "show_plan",
            "regenerate_plan",
            "update_plan",
            "pause_plan",
            "resume_plan",
            "reset_plan",
            "delete_plan",
            "plan_progress",
            "plan_summary",
            "next_step",
            "add_step",
            "update_step",
            "show_step",
            "skip_step",
            "delete_step",
            "health",
        ] {
            assert!(names.iter().any(|name| name == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn test_server_info_advertises_tools() {
        let (_dir, server) = server().await;
        let info = server.get_info();
        assert_eq!(info.server_info.name, "waypoint");
        assert!(info.capabilities.tools.is_some());
    }
}
