//! Shared helpers for waypoint-core integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use tempfile::TempDir;
use waypoint_core::{
    Planner, PlannerBuilder,
    params::{CreatePlan, NewStep},
};

/// A planner on a throwaway database. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let planner = PlannerBuilder::new()
        .with_database_path(temp_dir.path().join("test.db"))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

/// Path of a database file inside a fresh temp dir.
pub fn temp_db_path() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("test.db");
    (temp_dir, path)
}

pub fn step(id: &str, description: &str, depends_on: &[&str]) -> NewStep {
    NewStep {
        step_id: Some(id.to_string()),
        depends_on: depends_on.iter().map(|dep| dep.to_string()).collect(),
        ..NewStep::described(description)
    }
}

pub fn plan_params(name: &str, user_id: &str, steps: Vec<NewStep>) -> CreatePlan {
    CreatePlan {
        name: name.to_string(),
        description: format!("{name} description"),
        user_id: user_id.to_string(),
        steps,
    }
}
