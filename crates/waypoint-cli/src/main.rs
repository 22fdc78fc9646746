//! Waypoint CLI Application
//!
//! Command-line interface and MCP server for the waypoint plan tracker.

mod args;
mod cli;
mod mcp;
mod renderer;

use Commands::*;
use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use mcp::{WaypointMcpServer, run_stdio_server};
use renderer::TerminalRenderer;
use waypoint_core::{PlannerBuilder, params::ListPlans};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("WAYPOINT_LOG", "warn"))
        .init();

    let Args {
        database_file,
        no_color,
        user,
        command,
    } = Args::parse();

    let mut builder = PlannerBuilder::new();
    if let Some(path) = database_file {
        builder = builder.with_database_path(path);
    }
    let planner = builder
        .build()
        .await
        .context("Failed to initialize planner")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("Waypoint started");

    match command {
        Some(Plan { command }) => {
            Cli::new(planner, renderer, user)
                .handle_plan_command(command)
                .await
        }
        Some(Step { command }) => {
            Cli::new(planner, renderer, user)
                .handle_step_command(command)
                .await
        }
        Some(Health) => Cli::new(planner, renderer, user).health().await,
        Some(Serve) => {
            info!("Starting Waypoint MCP server");
            run_stdio_server(WaypointMcpServer::new(planner))
                .await
                .context("MCP server failed")
        }
        None => {
            let params = ListPlans {
                user_id: user.clone(),
                ..Default::default()
            };
            Cli::new(planner, renderer, user).list_plans(&params).await
        }
    }
}
