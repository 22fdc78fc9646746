//! Tests for the planner module.

use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use tempfile::TempDir;

use super::*;
use crate::{
    models::{PlanStatus, StepStatus},
    params::{AddStep, CreatePlan, DeletePlan, Id, ListPlans, NewStep, StepRef, UpdateStep},
    resolver::NextAction,
};

/// Helper function to create a test planner
async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(&db_path)
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}

fn two_step_plan() -> CreatePlan {
    CreatePlan {
        name: "Test Plan".to_string(),
        description: "Test Description".to_string(),
        user_id: "tester".to_string(),
        steps: vec![
            NewStep {
                step_id: Some("a".to_string()),
                ..NewStep::described("First")
            },
            NewStep {
                step_id: Some("b".to_string()),
                depends_on: vec!["a".to_string()],
                ..NewStep::described("Second")
            },
        ],
    }
}

fn complete(plan: &Plan, step_id: &str) -> UpdateStep {
    UpdateStep {
        plan_id: plan.plan_id().to_string(),
        step_id: step_id.to_string(),
        status: Some(StepStatus::Completed),
        notes: None,
    }
}

#[tokio::test]
async fn test_create_then_get() {
    let (_temp_dir, planner) = create_test_planner().await;

    let created = planner
        .create_plan(&two_step_plan())
        .await
        .expect("Failed to create plan");
    let loaded = planner
        .get_plan(&Id {
            id: created.plan_id().to_string(),
        })
        .await
        .expect("Failed to get plan");

    assert_eq!(loaded, created);
    assert_eq!(loaded.status(), PlanStatus::NotStarted);
}

#[tokio::test]
async fn test_invalid_create_writes_nothing() {
    let (_temp_dir, planner) = create_test_planner().await;

    let mut params = two_step_plan();
    params.steps.clear();
    assert!(planner.create_plan(&params).await.unwrap_err().is_validation());

    let plans = planner.list_plans(&ListPlans::default()).await.unwrap();
    assert!(plans.is_empty());
}

#[tokio::test]
async fn test_step_flow_updates_status_and_next() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();
    let id = Id {
        id: plan.plan_id().to_string(),
    };

    match planner.next_step(&id).await.unwrap() {
        NextAction::Ready(step) => assert_eq!(step.step_id, "a"),
        other => panic!("expected a ready step, got {other:?}"),
    }

    let step = planner.update_step(&complete(&plan, "a")).await.unwrap();
    assert_eq!(step.status, StepStatus::Completed);
    assert!(step.completed_at.is_some());
    assert_eq!(
        planner.get_plan(&id).await.unwrap().status(),
        PlanStatus::InProgress
    );

    planner.update_step(&complete(&plan, "b")).await.unwrap();
    assert_eq!(planner.next_step(&id).await.unwrap(), NextAction::Finished);

    let progress = planner.progress(&id).await.unwrap();
    assert_eq!(progress.total, 2);
    assert_eq!(progress.percent_complete, 100.0);
    assert_eq!(
        planner.summary(&id).await.unwrap().status,
        PlanStatus::Completed
    );
}

#[tokio::test]
async fn test_add_and_delete_step() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();

    let added = planner
        .add_step(&AddStep {
            plan_id: plan.plan_id().to_string(),
            step: NewStep {
                depends_on: vec!["b".to_string()],
                ..NewStep::described("Third")
            },
        })
        .await
        .unwrap();
    assert_eq!(added.order, 3);

    let removed = planner
        .delete_step(&StepRef {
            plan_id: plan.plan_id().to_string(),
            step_id: "b".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(removed.description, "Second");

    let (step, blockers) = planner
        .get_step_with_blockers(&StepRef {
            plan_id: plan.plan_id().to_string(),
            step_id: added.step_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(step.step_id, added.step_id);
    assert_eq!(blockers.len(), 1);
    assert_eq!(blockers[0].step_id, "b");
}

#[tokio::test]
async fn test_missing_plan_and_step() {
    let (_temp_dir, planner) = create_test_planner().await;
    let missing = Id {
        id: "does-not-exist".to_string(),
    };
    assert!(matches!(
        planner.reset_plan(&missing).await,
        Err(PlannerError::PlanNotFound { .. })
    ));

    let plan = planner.create_plan(&two_step_plan()).await.unwrap();
    let err = planner
        .skip_step(&StepRef {
            plan_id: plan.plan_id().to_string(),
            step_id: "zzz".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, PlannerError::StepNotFound { .. }));
}

#[tokio::test]
async fn test_delete_requires_confirmation() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();

    let mut params = DeletePlan {
        id: plan.plan_id().to_string(),
        confirmed: false,
    };
    assert!(planner.delete_plan(&params).await.unwrap_err().is_validation());

    params.confirmed = true;
    let deleted = planner.delete_plan(&params).await.unwrap();
    assert_eq!(deleted.plan_id(), plan.plan_id());
    assert!(planner.delete_plan(&params).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_pause_and_resume_round_trip_through_storage() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();
    let id = Id {
        id: plan.plan_id().to_string(),
    };

    assert_eq!(
        planner.pause_plan(&id).await.unwrap().status(),
        PlanStatus::Paused
    );
    assert_eq!(
        planner.get_plan(&id).await.unwrap().status(),
        PlanStatus::Paused
    );
    assert_eq!(
        planner.resume_plan(&id).await.unwrap().status(),
        PlanStatus::NotStarted
    );
}

#[tokio::test]
async fn test_zero_attempts_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let result = PlannerBuilder::new()
        .with_database_path(temp_dir.path().join("test.db"))
        .with_max_attempts(0)
        .build()
        .await;
    assert!(matches!(result, Err(PlannerError::Configuration { .. })));
}

#[tokio::test]
async fn test_health_reports_connected() {
    let (_temp_dir, planner) = create_test_planner().await;
    assert!(planner.health().await.database_connected);
}

/// A transform that commits a competing write through its own connection
/// on the first `interfering` attempts, so the planner's write loses.
fn interfering_transform(
    db_path: PathBuf,
    interfering: u32,
    attempts: Arc<AtomicU32>,
) -> impl FnMut(Plan, Timestamp) -> Result<(Plan, ())> + Send + 'static {
    move |plan, now| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= interfering {
            let mut other = Database::new(&db_path)?;
            let stored = other
                .get_plan(plan.plan_id())?
                .expect("plan exists for the competing write");
            other.update_plan(&stored.plan, stored.revision)?;
        }
        let plan = crate::mutations::pause_plan(plan, now);
        Ok((plan, ()))
    }
}

#[tokio::test]
async fn test_lost_race_is_retried_on_a_fresh_snapshot() {
    let (_temp_dir, planner) = create_test_planner().await;
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();
    let attempts = Arc::new(AtomicU32::new(0));

    let (updated, ()) = planner
        .modify_plan(
            plan.plan_id(),
            interfering_transform(planner.db_path.clone(), 1, Arc::clone(&attempts)),
        )
        .await
        .unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert_eq!(updated.status(), PlanStatus::Paused);
    let stored = planner
        .with_database({
            let plan_id = plan.plan_id().to_string();
            move |db| db.get_plan(&plan_id)
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.plan.status(), PlanStatus::Paused);
    // insert, competing write, retried write
    assert_eq!(stored.revision, 3);
}

#[tokio::test]
async fn test_retries_give_up_after_max_attempts() {
    let temp_dir = TempDir::new().unwrap();
    let planner = PlannerBuilder::new()
        .with_database_path(temp_dir.path().join("test.db"))
        .with_max_attempts(3)
        .build()
        .await
        .unwrap();
    let plan = planner.create_plan(&two_step_plan()).await.unwrap();
    let attempts = Arc::new(AtomicU32::new(0));

    let err = planner
        .modify_plan(
            plan.plan_id(),
            interfering_transform(planner.db_path.clone(), u32::MAX, Arc::clone(&attempts)),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        PlannerError::RevisionConflict { attempts: 3, .. }
    ));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(
        planner
            .get_plan(&Id {
                id: plan.plan_id().to_string(),
            })
            .await
            .unwrap()
            .status(),
        PlanStatus::NotStarted
    );
}
