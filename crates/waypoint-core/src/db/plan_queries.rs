//! Plan document reads and conditional writes.

use rusqlite::{OptionalExtension, params};

use super::{StoredPlan, WriteOutcome};
use crate::{
    error::{DatabaseResultExt, PlannerError, Result},
    models::{Plan, PlanFilter},
};

const INSERT_PLAN_SQL: &str = "INSERT INTO plans (plan_id, user_id, name, status, revision, document, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7)";
const SELECT_PLAN_SQL: &str = "SELECT document, revision FROM plans WHERE plan_id = ?1";
const CHECK_PLAN_EXISTS_SQL: &str = "SELECT EXISTS(SELECT 1 FROM plans WHERE plan_id = ?1)";
const UPDATE_PLAN_SQL: &str = "UPDATE plans SET name = ?1, status = ?2, document = ?3, updated_at = ?4, revision = revision + 1 WHERE plan_id = ?5 AND revision = ?6";
const DELETE_PLAN_SQL: &str = "DELETE FROM plans WHERE plan_id = ?1 AND revision = ?2";
const LIST_PLANS_SQL: &str = "SELECT document, revision FROM plans WHERE (?1 IS NULL OR user_id = ?1) AND (?2 IS NULL OR status = ?2) ORDER BY created_at DESC, plan_id";

/// Decodes a stored document and re-derives its status unless it is paused.
fn decode_plan(document: &str, revision: i64) -> Result<StoredPlan> {
    let mut plan: Plan = serde_json::from_str(document)?;
    plan.reconcile_status();
    Ok(StoredPlan { plan, revision })
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<(String, i64)> {
    Ok((row.get(0)?, row.get(1)?))
}

impl super::Database {
    /// Stores a new plan document at revision 1.
    pub fn insert_plan(&mut self, plan: &Plan) -> Result<i64> {
        let document = serde_json::to_string(plan)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        tx.execute(
            INSERT_PLAN_SQL,
            params![
                plan.plan_id(),
                plan.user_id(),
                plan.name(),
                plan.status().as_str(),
                document,
                plan.created_at().to_string(),
                plan.updated_at().to_string(),
            ],
        )
        .db_context("Failed to insert plan")?;
        tx.commit().db_context("Failed to commit transaction")?;

        Ok(1)
    }

    /// Loads a plan document and the revision it was read at.
    pub fn get_plan(&self, plan_id: &str) -> Result<Option<StoredPlan>> {
        let mut stmt = self
            .connection
            .prepare(SELECT_PLAN_SQL)
            .db_context("Failed to prepare query")?;

        stmt.query_row(params![plan_id], read_row)
            .optional()
            .db_context("Failed to query plan")?
            .map(|(document, revision)| decode_plan(&document, revision))
            .transpose()
    }

    /// Checks whether a plan row exists.
    pub fn plan_exists(&self, plan_id: &str) -> Result<bool> {
        self.connection
            .query_row(CHECK_PLAN_EXISTS_SQL, params![plan_id], |row| row.get(0))
            .db_context("Failed to check plan existence")
    }

    /// Rewrites the whole document if the stored revision still equals
    /// `expected_revision`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` if the row is gone.
    pub fn update_plan(&mut self, plan: &Plan, expected_revision: i64) -> Result<WriteOutcome> {
        let document = serde_json::to_string(plan)?;

        let tx = self
            .connection
            .transaction()
            .db_context("Failed to begin transaction")?;
        let affected = tx
            .execute(
                UPDATE_PLAN_SQL,
                params![
                    plan.name(),
                    plan.status().as_str(),
                    document,
                    plan.updated_at().to_string(),
                    plan.plan_id(),
                    expected_revision,
                ],
            )
            .db_context("Failed to update plan")?;
        tx.commit().db_context("Failed to commit transaction")?;

        if affected > 0 {
            return Ok(WriteOutcome::Applied(expected_revision + 1));
        }
        if self.plan_exists(plan.plan_id())? {
            Ok(WriteOutcome::Conflict)
        } else {
            Err(PlannerError::PlanNotFound {
                id: plan.plan_id().to_string(),
            })
        }
    }

    /// Deletes a plan if the stored revision still equals
    /// `expected_revision`.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::PlanNotFound` if the row is gone.
    pub fn delete_plan(&mut self, plan_id: &str, expected_revision: i64) -> Result<WriteOutcome> {
        let affected = self
            .connection
            .execute(DELETE_PLAN_SQL, params![plan_id, expected_revision])
            .db_context("Failed to delete plan")?;

        if affected > 0 {
            return Ok(WriteOutcome::Applied(expected_revision));
        }
        if self.plan_exists(plan_id)? {
            Ok(WriteOutcome::Conflict)
        } else {
            Err(PlannerError::PlanNotFound {
                id: plan_id.to_string(),
            })
        }
    }

    /// Lists plans matching the filter, newest first.
    ///
    /// Owner and status are matched in SQL against the denormalised columns;
    /// the name match runs on the decoded plans.
    pub fn list_plans(&self, filter: &PlanFilter) -> Result<Vec<Plan>> {
        let mut stmt = self
            .connection
            .prepare(LIST_PLANS_SQL)
            .db_context("Failed to prepare query")?;

        let rows = stmt
            .query_map(
                params![
                    filter.user_id.as_deref(),
                    filter.status.map(|status| status.as_str())
                ],
                read_row,
            )
            .db_context("Failed to query plans")?;

        let mut plans = Vec::new();
        for row in rows {
            let (document, revision) = row.db_context("Failed to read plan row")?;
            let stored = decode_plan(&document, revision)?;
            if filter.matches(&stored.plan) {
                plans.push(stored.plan);
            }
        }

        plans.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.plan_id().cmp(b.plan_id()))
        });
        Ok(plans)
    }
}
