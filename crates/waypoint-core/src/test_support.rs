//! Fixtures shared by the unit tests.

use jiff::Timestamp;

use crate::models::{Plan, Step, StepStatus};

/// 2024-01-01 00:00:00 UTC
pub(crate) fn t0() -> Timestamp {
    Timestamp::from_second(1_704_067_200).unwrap()
}

pub(crate) fn at(seconds_after_t0: i64) -> Timestamp {
    Timestamp::from_second(1_704_067_200 + seconds_after_t0).unwrap()
}

pub(crate) fn step(id: &str, order: u32, status: StepStatus, depends_on: &[&str]) -> Step {
    let mut step = Step::new(
        id.to_string(),
        order,
        format!("Step {id}"),
        depends_on.iter().map(|dep| dep.to_string()).collect(),
        None,
        t0(),
    );
    step.set_status(status, t0());
    step
}

pub(crate) fn plan(steps: Vec<Step>) -> Plan {
    Plan::new(
        "plan-1".to_string(),
        "Test Plan".to_string(),
        "A plan used in tests".to_string(),
        "user-1".to_string(),
        steps,
        t0(),
    )
}
