//! Error handling utilities for MCP server

use rmcp::ErrorData;
use waypoint_core::PlannerError;

/// Maps a planner error onto the closest MCP error code.
pub fn to_mcp_error(message: &str, error: &PlannerError) -> ErrorData {
    let text = format!("{message}: {error}");
    match error {
        PlannerError::Validation { .. } => ErrorData::invalid_params(text, None),
        PlannerError::PlanNotFound { .. } | PlannerError::StepNotFound { .. } => {
            ErrorData::resource_not_found(text, None)
        }
        _ => ErrorData::internal_error(text, None),
    }
}
