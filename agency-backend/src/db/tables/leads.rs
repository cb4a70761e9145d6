//! Lead intake database operations

use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{format_timestamp, now, parse_timestamp};
use crate::error::{AppError, AppResult};
use crate::models::{Lead, LeadWithMilestones, Milestone, MilestoneTemplate, NewLead, MILESTONE_TEMPLATES};
use super::super::Database;

const LEAD_COLUMNS: &str = "id, name, email, company, phone, business_type, company_size, annual_revenue, \
     client_value, marketing_needs, timeline, budget, source, message, created_at";

fn row_to_lead(row: &Row) -> rusqlite::Result<Lead> {
    let created_at_str: String = row.get(14)?;
    Ok(Lead {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        company: row.get(3)?,
        phone: row.get(4)?,
        business_type: row.get(5)?,
        company_size: row.get(6)?,
        annual_revenue: row.get(7)?,
        client_value: row.get(8)?,
        marketing_needs: row.get(9)?,
        timeline: row.get(10)?,
        budget: row.get(11)?,
        source: row.get(12)?,
        message: row.get(13)?,
        created_at: parse_timestamp(14, &created_at_str)?,
    })
}

/// Not-found unless a lead row with this id exists
pub(super) fn ensure_lead_exists(conn: &Connection, lead_id: &str) -> AppResult<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM leads WHERE id = ?1)",
        [lead_id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Lead {} not found", lead_id)))
    }
}

impl Database {
    /// Persist a lead and seed its timeline in one transaction
    pub fn create_lead(&self, new_lead: &NewLead) -> AppResult<LeadWithMilestones> {
        self.create_lead_with_template(new_lead, MILESTONE_TEMPLATES)
    }

    pub(crate) fn create_lead_with_template(
        &self,
        new_lead: &NewLead,
        templates: &[MilestoneTemplate],
    ) -> AppResult<LeadWithMilestones> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let created_at_str = format_timestamp(&created_at);

        tx.execute(
            &format!(
                "INSERT INTO leads ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
                LEAD_COLUMNS
            ),
            rusqlite::params![
                &id,
                &new_lead.name,
                &new_lead.email,
                &new_lead.company,
                &new_lead.phone,
                &new_lead.business_type,
                &new_lead.company_size,
                &new_lead.annual_revenue,
                &new_lead.client_value,
                &new_lead.marketing_needs,
                &new_lead.timeline,
                &new_lead.budget,
                &new_lead.source,
                &new_lead.message,
                &created_at_str,
            ],
        )?;

        let mut milestones = Vec::with_capacity(templates.len());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO lead_milestones (lead_id, milestone_id, title, description, position, completed, completed_at, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0, NULL, ?6)",
            )?;
            for (position, template) in templates.iter().enumerate() {
                stmt.execute(rusqlite::params![
                    &id,
                    template.milestone_id,
                    template.title,
                    template.description,
                    position as i64,
                    &created_at_str,
                ])?;
                milestones.push(Milestone {
                    id: tx.last_insert_rowid(),
                    lead_id: id.clone(),
                    milestone_id: template.milestone_id.to_string(),
                    title: template.title.to_string(),
                    description: template.description.to_string(),
                    position: position as i64,
                    completed: false,
                    completed_at: None,
                    created_at,
                });
            }
        }

        tx.commit()?;
        log::info!("Created lead {} with {} milestones", id, milestones.len());

        Ok(LeadWithMilestones {
            lead: Lead {
                id,
                name: new_lead.name.clone(),
                email: new_lead.email.clone(),
                company: new_lead.company.clone(),
                phone: new_lead.phone.clone(),
                business_type: new_lead.business_type.clone(),
                company_size: new_lead.company_size.clone(),
                annual_revenue: new_lead.annual_revenue.clone(),
                client_value: new_lead.client_value.clone(),
                marketing_needs: new_lead.marketing_needs.clone(),
                timeline: new_lead.timeline.clone(),
                budget: new_lead.budget.clone(),
                source: new_lead.source.clone(),
                message: new_lead.message.clone(),
                created_at,
            },
            milestones,
        })
    }

    pub fn get_lead(&self, lead_id: &str) -> AppResult<Option<Lead>> {
        let conn = self.conn()?;
        let lead = conn
            .query_row(
                &format!("SELECT {} FROM leads WHERE id = ?1", LEAD_COLUMNS),
                [lead_id],
                row_to_lead,
            )
            .optional()?;
        Ok(lead)
    }

    /// Newest first
    pub fn list_leads(&self, limit: u32, offset: u32) -> AppResult<Vec<Lead>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM leads ORDER BY created_at DESC, id ASC LIMIT ?1 OFFSET ?2",
            LEAD_COLUMNS
        ))?;
        let leads = stmt
            .query_map(rusqlite::params![limit, offset], row_to_lead)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(leads)
    }

    pub fn count_leads(&self) -> AppResult<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM leads", [], |row| row.get(0))?;
        Ok(count)
    }
}
