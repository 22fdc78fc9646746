//! Filter types for querying plans.

use super::{Plan, PlanStatus};
use crate::params::ListPlans;

/// Filter criteria for listing plans. Every criterion is optional and they
/// combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanFilter {
    /// Exact owner match
    pub user_id: Option<String>,
    /// Exact status match
    pub status: Option<PlanStatus>,
    /// Case-insensitive substring of the plan name
    pub name_contains: Option<String>,
}

impl PlanFilter {
    /// Whether the plan passes every criterion.
    pub fn matches(&self, plan: &Plan) -> bool {
        if let Some(user_id) = &self.user_id
            && plan.user_id() != user_id
        {
            return false;
        }
        if let Some(status) = self.status
            && plan.status() != status
        {
            return false;
        }
        if let Some(needle) = &self.name_contains
            && !plan.name().to_lowercase().contains(&needle.to_lowercase())
        {
            return false;
        }
        true
    }
}

impl From<&ListPlans> for PlanFilter {
    fn from(params: &ListPlans) -> Self {
        let non_blank = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            user_id: non_blank(&params.user_id),
            status: params.status,
            name_contains: non_blank(&params.name),
        }
    }
}
