//! Step model definition and status transitions.

use std::collections::BTreeSet;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::StepStatus;

/// Represents an individual step within a plan.
///
/// Steps only exist inside a [`super::Plan`]; the plan hands them out by
/// shared reference, so every state change goes through the mutation API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Opaque identifier, unique within the plan
    pub step_id: String,

    /// User-assigned position; neither unique nor contiguous
    pub order: u32,

    /// What needs to be done
    pub description: String,

    /// Current status of the step
    pub status: StepStatus,

    /// Steps (by ID) that must be completed before this one can start.
    /// Targets are not required to exist.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub depends_on: BTreeSet<String>,

    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Timestamp when the step was created (UTC)
    pub created_at: Timestamp,

    /// Timestamp of the last change to the step (UTC)
    pub updated_at: Timestamp,

    /// Set when the step enters `completed`, cleared when it leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Timestamp>,
}

impl Step {
    pub(crate) fn new(
        step_id: String,
        order: u32,
        description: String,
        depends_on: BTreeSet<String>,
        notes: Option<String>,
        now: Timestamp,
    ) -> Self {
        Self {
            step_id,
            order,
            description,
            status: StepStatus::Pending,
            depends_on,
            notes,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// Applies a status change.
    ///
    /// Entering `completed` stamps `completed_at` once; re-completing an
    /// already completed step keeps the original stamp. Leaving `completed`
    /// clears it.
    pub(crate) fn set_status(&mut self, status: StepStatus, now: Timestamp) {
        match (self.status, status) {
            (StepStatus::Completed, StepStatus::Completed) => {}
            (_, StepStatus::Completed) => self.completed_at = Some(now),
            _ => self.completed_at = None,
        }
        self.status = status;
        self.updated_at = now;
    }

    pub(crate) fn set_notes(&mut self, notes: String, now: Timestamp) {
        self.notes = Some(notes);
        self.updated_at = now;
    }

    pub(crate) fn skip(&mut self, now: Timestamp) {
        self.set_status(StepStatus::Skipped, now);
    }

    /// Returns the step to `pending`. Returns whether anything changed;
    /// an untouched step keeps its `updated_at`.
    pub(crate) fn reset(&mut self, now: Timestamp) -> bool {
        if self.status == StepStatus::Pending && self.completed_at.is_none() {
            return false;
        }
        self.set_status(StepStatus::Pending, now);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.status == StepStatus::Pending
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepStatus::Completed
    }
}
