//! Aggregate plan status derived from step statuses.
//!
//! The rules are evaluated in order and the first match wins:
//!
//! 1. no steps → `not_started`
//! 2. any step `failed` → `failed`
//! 3. every step `completed` → `completed`
//! 4. every step `pending` → `not_started`
//! 5. anything else → `in_progress`
//!
//! `paused` is never produced here. A plan whose steps are all `skipped`
//! falls through to rule 5.

use crate::models::{PlanStatus, Step, StepStatus};

/// Derives the plan status for a sequence of steps.
///
/// # Examples
///
/// ```rust
/// use waypoint_core::{derivation::derive_plan_status, models::PlanStatus};
///
/// assert_eq!(derive_plan_status(&[]), PlanStatus::NotStarted);
/// ```
pub fn derive_plan_status(steps: &[Step]) -> PlanStatus {
    derive_from_statuses(steps.iter().map(|step| step.status))
}

/// Same rules as [`derive_plan_status`], over bare statuses.
pub fn derive_from_statuses<I>(statuses: I) -> PlanStatus
where
    I: IntoIterator<Item = StepStatus>,
{
    let mut any = false;
    let mut any_failed = false;
    let mut all_completed = true;
    let mut all_pending = true;

    for status in statuses {
        any = true;
        any_failed |= status == StepStatus::Failed;
        all_completed &= status == StepStatus::Completed;
        all_pending &= status == StepStatus::Pending;
    }

    if !any {
        PlanStatus::NotStarted
    } else if any_failed {
        PlanStatus::Failed
    } else if all_completed {
        PlanStatus::Completed
    } else if all_pending {
        PlanStatus::NotStarted
    } else {
        PlanStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use StepStatus::*;

    #[test]
    fn test_empty_is_not_started() {
        assert_eq!(derive_from_statuses([]), PlanStatus::NotStarted);
    }

    #[test]
    fn test_all_completed() {
        assert_eq!(derive_from_statuses([Completed]), PlanStatus::Completed);
        assert_eq!(
            derive_from_statuses([Completed, Completed, Completed]),
            PlanStatus::Completed
        );
    }

    #[test]
    fn test_all_pending() {
        assert_eq!(derive_from_statuses([Pending]), PlanStatus::NotStarted);
        assert_eq!(
            derive_from_statuses([Pending, Pending]),
            PlanStatus::NotStarted
        );
    }

    #[test]
    fn test_failed_wins_over_everything() {
        assert_eq!(derive_from_statuses([Failed]), PlanStatus::Failed);
        assert_eq!(
            derive_from_statuses([Completed, Completed, Failed]),
            PlanStatus::Failed
        );
        assert_eq!(
            derive_from_statuses([Pending, InProgress, Skipped, Failed]),
            PlanStatus::Failed
        );
    }

    #[test]
    fn test_mixtures_are_in_progress() {
        assert_eq!(
            derive_from_statuses([Pending, Completed]),
            PlanStatus::InProgress
        );
        assert_eq!(derive_from_statuses([InProgress]), PlanStatus::InProgress);
        assert_eq!(
            derive_from_statuses([Completed, Skipped]),
            PlanStatus::InProgress
        );
        assert_eq!(
            derive_from_statuses([Pending, Skipped]),
            PlanStatus::InProgress
        );
    }

    #[test]
    fn test_all_skipped_is_in_progress() {
        assert_eq!(
            derive_from_statuses([Skipped, Skipped]),
            PlanStatus::InProgress
        );
    }

    #[test]
    fn test_never_derives_paused() {
        let samples: [&[StepStatus]; 6] = [
            &[],
            &[Pending],
            &[InProgress, Completed],
            &[Failed],
            &[Skipped],
            &[Completed],
        ];
        for statuses in samples {
            assert_ne!(
                derive_from_statuses(statuses.iter().copied()),
                PlanStatus::Paused
            );
        }
    }
}
