//! Dependency-aware selection of the next actionable step.
//!
//! The resolver only looks at the current status snapshot: each dependency
//! is checked by a single lookup, never by walking further down the chain.
//! A dependency cycle therefore just leaves the steps involved permanently
//! ineligible, and a reference to a step that does not exist (never added,
//! or since deleted) counts as unmet rather than as an error.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::{Plan, Step};

/// Outcome of checking one `depends_on` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Satisfaction {
    /// The target exists and is completed
    Satisfied,
    /// The target exists but is not completed
    Unsatisfied,
    /// No step in the plan has this ID
    Absent,
}

impl Satisfaction {
    pub fn is_satisfied(self) -> bool {
        self == Satisfaction::Satisfied
    }
}

/// An unmet dependency of a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blocker {
    pub step_id: String,
    pub satisfaction: Satisfaction,
}

/// Owned answer to "what should happen next in this plan".
#[derive(Debug, Clone, PartialEq)]
pub enum NextAction {
    /// This pending step has all dependencies completed
    Ready(Step),
    /// Pending steps remain but none of them is eligible
    Blocked { pending: usize },
    /// No pending steps remain
    Finished,
}

/// Index from step ID to step, built once per resolver call.
///
/// The first step with a given ID wins, matching [`Plan::step`].
struct StepIndex<'a>(HashMap<&'a str, &'a Step>);

impl<'a> StepIndex<'a> {
    fn new(plan: &'a Plan) -> Self {
        let mut index = HashMap::with_capacity(plan.steps().len());
        for step in plan.steps() {
            index.entry(step.step_id.as_str()).or_insert(step);
        }
        Self(index)
    }

    fn satisfaction(&self, dependency: &str) -> Satisfaction {
        match self.0.get(dependency) {
            Some(step) if step.is_completed() => Satisfaction::Satisfied,
            Some(_) => Satisfaction::Unsatisfied,
            None => Satisfaction::Absent,
        }
    }

    fn is_eligible(&self, step: &Step) -> bool {
        step.is_pending()
            && step
                .depends_on
                .iter()
                .all(|dep| self.satisfaction(dep).is_satisfied())
    }
}

/// Checks a single dependency reference against the plan.
pub fn dependency_satisfaction(plan: &Plan, dependency: &str) -> Satisfaction {
    StepIndex::new(plan).satisfaction(dependency)
}

/// Lists the dependencies of `step` that are not satisfied, in ID order.
pub fn blockers(plan: &Plan, step: &Step) -> Vec<Blocker> {
    let index = StepIndex::new(plan);
    step.depends_on
        .iter()
        .filter_map(|dep| {
            let satisfaction = index.satisfaction(dep);
            (!satisfaction.is_satisfied()).then(|| Blocker {
                step_id: dep.clone(),
                satisfaction,
            })
        })
        .collect()
}

/// Whether `step` is pending and every one of its dependencies is completed.
pub fn is_eligible(plan: &Plan, step: &Step) -> bool {
    StepIndex::new(plan).is_eligible(step)
}

/// All eligible steps, sorted by `order`, then `created_at`, then `step_id`.
pub fn eligible_steps(plan: &Plan) -> Vec<&Step> {
    let index = StepIndex::new(plan);
    plan.ordered_steps()
        .into_iter()
        .filter(|step| index.is_eligible(step))
        .collect()
}

/// Picks the eligible pending step with the smallest `order`.
///
/// Ties fall back to the earliest `created_at`, then the smallest `step_id`.
/// `None` means the plan is either finished or blocked; use
/// [`next_action`] to tell the two apart.
pub fn next_step(plan: &Plan) -> Option<&Step> {
    let index = StepIndex::new(plan);
    plan.steps()
        .iter()
        .filter(|step| index.is_eligible(step))
        .min_by(|a, b| {
            a.order
                .cmp(&b.order)
                .then_with(|| a.created_at.cmp(&b.created_at))
                .then_with(|| a.step_id.cmp(&b.step_id))
        })
}

/// Like [`next_step`], but distinguishes a blocked plan from a finished one.
pub fn next_action(plan: &Plan) -> NextAction {
    if let Some(step) = next_step(plan) {
        return NextAction::Ready(step.clone());
    }

    let pending = plan.steps().iter().filter(|step| step.is_pending()).count();
    if pending > 0 {
        NextAction::Blocked { pending }
    } else {
        NextAction::Finished
    }
}

/// IDs referenced in `depends_on` that match no step in the plan.
pub fn dangling_dependencies(plan: &Plan) -> Vec<String> {
    let known: HashSet<&str> = plan.steps().iter().map(|s| s.step_id.as_str()).collect();
    let mut dangling: Vec<String> = plan
        .steps()
        .iter()
        .flat_map(|step| step.depends_on.iter())
        .filter(|dep| !known.contains(dep.as_str()))
        .cloned()
        .collect();
    dangling.sort();
    dangling.dedup();
    dangling
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::StepStatus::*,
        test_support::{at, plan, step},
    };

    #[test]
    fn test_lowest_order_wins() {
        let plan = plan(vec![
            step("f", 2, Pending, &[]),
            step("e", 1, Pending, &[]),
        ]);
        assert_eq!(next_step(&plan).map(|s| s.step_id.as_str()), Some("e"));
    }

    #[test]
    fn test_chain_advances_as_dependencies_complete() {
        let mut plan = plan(vec![
            step("a", 1, Pending, &[]),
            step("b", 2, Pending, &["a"]),
        ]);
        assert_eq!(next_step(&plan).unwrap().step_id, "a");

        plan.step_mut("a").unwrap().set_status(Completed, at(10));
        assert_eq!(next_step(&plan).unwrap().step_id, "b");

        plan.step_mut("b").unwrap().set_status(Completed, at(20));
        assert!(next_step(&plan).is_none());
        assert_eq!(next_action(&plan), NextAction::Finished);
    }

    #[test]
    fn test_dangling_dependency_is_never_selected() {
        let plan = plan(vec![step("d", 1, Pending, &["ghost-id"])]);
        assert!(next_step(&plan).is_none());
        assert_eq!(next_action(&plan), NextAction::Blocked { pending: 1 });
        assert_eq!(
            blockers(&plan, plan.step("d").unwrap()),
            vec![Blocker {
                step_id: "ghost-id".to_string(),
                satisfaction: Satisfaction::Absent,
            }]
        );
    }

    #[test]
    fn test_cycle_is_blocked_not_looping() {
        let plan = plan(vec![
            step("x", 1, Pending, &["y"]),
            step("y", 2, Pending, &["x"]),
        ]);
        assert!(next_step(&plan).is_none());
        assert_eq!(next_action(&plan), NextAction::Blocked { pending: 2 });
    }

    #[test]
    fn test_only_pending_steps_are_candidates() {
        let plan = plan(vec![
            step("a", 1, InProgress, &[]),
            step("b", 2, Failed, &[]),
            step("c", 3, Skipped, &[]),
            step("d", 4, Completed, &[]),
        ]);
        assert!(next_step(&plan).is_none());
        assert_eq!(next_action(&plan), NextAction::Finished);
    }

    #[test]
    fn test_skipped_dependency_does_not_satisfy() {
        let plan = plan(vec![
            step("a", 1, Skipped, &[]),
            step("b", 2, Pending, &["a"]),
        ]);
        assert!(next_step(&plan).is_none());
        assert_eq!(
            dependency_satisfaction(&plan, "a"),
            Satisfaction::Unsatisfied
        );
    }

    #[test]
    fn test_duplicate_ids_resolve_to_first_step() {
        let plan = plan(vec![
            step("a", 1, Completed, &[]),
            step("a", 2, Pending, &[]),
            step("b", 3, Pending, &["a"]),
        ]);
        assert_eq!(plan.step("a").unwrap().order, 1);
        assert_eq!(dependency_satisfaction(&plan, "a"), Satisfaction::Satisfied);
        assert!(blockers(&plan, plan.step("b").unwrap()).is_empty());
    }

    #[test]
    fn test_ties_break_on_created_at_then_id() {
        let mut late = step("a", 1, Pending, &[]);
        late.created_at = at(60);
        let early = step("z", 1, Pending, &[]);
        let plan_by_time = plan(vec![late, early]);
        assert_eq!(next_step(&plan_by_time).unwrap().step_id, "z");

        let plan_by_id = plan(vec![step("m", 1, Pending, &[]), step("k", 1, Pending, &[])]);
        assert_eq!(next_step(&plan_by_id).unwrap().step_id, "k");
    }

    #[test]
    fn test_eligible_steps_sorted() {
        let plan = plan(vec![
            step("c", 3, Pending, &[]),
            step("a", 1, Completed, &[]),
            step("b", 2, Pending, &["a"]),
            step("d", 4, Pending, &["c"]),
        ]);
        let ids: Vec<&str> = eligible_steps(&plan)
            .iter()
            .map(|s| s.step_id.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);
        assert!(!is_eligible(&plan, plan.step("d").unwrap()));
    }
}
