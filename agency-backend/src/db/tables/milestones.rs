//! Lead milestone tracker database operations

use rusqlite::{OptionalExtension, Row};

use crate::db::{format_timestamp, now, parse_timestamp};
use crate::error::{AppError, AppResult};
use crate::models::milestone::template_position;
use crate::models::{Milestone, MilestoneCompletion};
use super::leads::ensure_lead_exists;
use super::super::Database;

const MILESTONE_COLUMNS: &str =
    "id, lead_id, milestone_id, title, description, position, completed, completed_at, created_at";

fn row_to_milestone(row: &Row) -> rusqlite::Result<Milestone> {
    let completed_at_str: Option<String> = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    Ok(Milestone {
        id: row.get(0)?,
        lead_id: row.get(1)?,
        milestone_id: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        position: row.get(5)?,
        completed: row.get::<_, i64>(6)? != 0,
        completed_at: completed_at_str
            .map(|s| parse_timestamp(7, &s))
            .transpose()?,
        created_at: parse_timestamp(8, &created_at_str)?,
    })
}

impl Database {
    /// Milestones for a lead in template order, whatever order they were completed in
    pub fn list_milestones(&self, lead_id: &str) -> AppResult<Vec<Milestone>> {
        let conn = self.conn()?;
        ensure_lead_exists(&conn, lead_id)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM lead_milestones WHERE lead_id = ?1 ORDER BY position ASC, id ASC",
            MILESTONE_COLUMNS
        ))?;
        let milestones = stmt
            .query_map([lead_id], row_to_milestone)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(milestones)
    }

    /// Move a milestone from pending to completed.
    ///
    /// The update only matches pending rows, so a repeat call (or a concurrent
    /// retry) changes nothing and returns the row with its original
    /// `completed_at`.
    pub fn complete_milestone(&self, lead_id: &str, milestone_id: &str) -> AppResult<MilestoneCompletion> {
        let conn = self.conn()?;
        ensure_lead_exists(&conn, lead_id)?;

        if template_position(milestone_id).is_none() {
            return Err(AppError::InvalidArgument(format!(
                "Unknown milestone '{}'",
                milestone_id
            )));
        }

        let completed_at = format_timestamp(&now());
        let rows_affected = conn.execute(
            "UPDATE lead_milestones SET completed = 1, completed_at = ?1
             WHERE lead_id = ?2 AND milestone_id = ?3 AND completed = 0",
            rusqlite::params![&completed_at, lead_id, milestone_id],
        )?;

        let milestone = conn
            .query_row(
                &format!(
                    "SELECT {} FROM lead_milestones WHERE lead_id = ?1 AND milestone_id = ?2",
                    MILESTONE_COLUMNS
                ),
                [lead_id, milestone_id],
                row_to_milestone,
            )
            .optional()?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Milestone '{}' not found for lead {}",
                    milestone_id, lead_id
                ))
            })?;

        let newly_completed = rows_affected > 0;
        if newly_completed {
            log::info!("Lead {} completed milestone '{}'", lead_id, milestone_id);
        } else {
            log::debug!("Lead {} milestone '{}' already completed", lead_id, milestone_id);
        }

        Ok(MilestoneCompletion {
            milestone,
            newly_completed,
        })
    }
}
