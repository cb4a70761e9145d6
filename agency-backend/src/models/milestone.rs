//! Lead timeline milestones.
//!
//! Every lead gets the same ordered template. A milestone goes
//! `pending -> completed` once and never back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One step of the fixed timeline template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneTemplate {
    pub milestone_id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// Timeline seeded for every new lead, in display order
pub const MILESTONE_TEMPLATES: &[MilestoneTemplate] = &[
    MilestoneTemplate {
        milestone_id: "form_submitted",
        title: "Form Submitted",
        description: "We received your details and a strategist is reviewing them.",
    },
    MilestoneTemplate {
        milestone_id: "email_sent",
        title: "Welcome Email Sent",
        description: "A welcome email with next steps is on its way to your inbox.",
    },
    MilestoneTemplate {
        milestone_id: "call_scheduled",
        title: "Discovery Call Scheduled",
        description: "We have booked a call to dig into your goals and numbers.",
    },
    MilestoneTemplate {
        milestone_id: "strategy_delivered",
        title: "Strategy Delivered",
        description: "Your custom growth strategy has been delivered for review.",
    },
    MilestoneTemplate {
        milestone_id: "campaign_launched",
        title: "Campaign Launched",
        description: "Your first campaign is live.",
    },
];

/// Position of a milestone id within the template, if it belongs to it
pub fn template_position(milestone_id: &str) -> Option<usize> {
    MILESTONE_TEMPLATES
        .iter()
        .position(|t| t.milestone_id == milestone_id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: i64,
    pub lead_id: String,
    pub milestone_id: String,
    pub title: String,
    pub description: String,
    pub position: i64,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Result of a completion request. `newly_completed` is false on a repeat call,
/// which lets the caller skip its celebration.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneCompletion {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub newly_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadProgress {
    pub lead_id: String,
    pub total: usize,
    pub completed: usize,
    pub percent: u8,
    /// First pending milestone in template order
    pub next_milestone: Option<String>,
}

impl LeadProgress {
    /// Expects `milestones` in template order, as returned by the tracker
    pub fn from_milestones(lead_id: &str, milestones: &[Milestone]) -> Self {
        let total = milestones.len();
        let completed = milestones.iter().filter(|m| m.completed).count();
        let percent = if total == 0 {
            0
        } else {
            ((completed * 100) / total) as u8
        };

        Self {
            lead_id: lead_id.to_string(),
            total,
            completed,
            percent,
            next_milestone: milestones
                .iter()
                .find(|m| !m.completed)
                .map(|m| m.milestone_id.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn milestone(position: i64, completed: bool) -> Milestone {
        let t = &MILESTONE_TEMPLATES[position as usize];
        Milestone {
            id: position + 1,
            lead_id: "lead-1".into(),
            milestone_id: t.milestone_id.into(),
            title: t.title.into(),
            description: t.description.into(),
            position,
            completed,
            completed_at: completed.then(Utc::now),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_template_ids_are_unique() {
        let ids: HashSet<_> = MILESTONE_TEMPLATES.iter().map(|t| t.milestone_id).collect();
        assert_eq!(ids.len(), MILESTONE_TEMPLATES.len());
        assert_eq!(MILESTONE_TEMPLATES[0].milestone_id, "form_submitted");
    }

    #[test]
    fn test_template_position() {
        assert_eq!(template_position("form_submitted"), Some(0));
        assert_eq!(template_position("call_scheduled"), Some(2));
        assert_eq!(template_position("contract_signed"), None);
        assert_eq!(template_position("FORM_SUBMITTED"), None);
    }

    #[test]
    fn test_progress_counts_and_next_step() {
        let milestones = vec![
            milestone(0, true),
            milestone(1, false),
            milestone(2, true),
            milestone(3, false),
            milestone(4, false),
        ];
        let progress = LeadProgress::from_milestones("lead-1", &milestones);
        assert_eq!(progress.total, 5);
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.percent, 40);
        assert_eq!(progress.next_milestone.as_deref(), Some("email_sent"));
    }

    #[test]
    fn test_progress_when_done() {
        let milestones: Vec<_> = (0..5).map(|p| milestone(p, true)).collect();
        let progress = LeadProgress::from_milestones("lead-1", &milestones);
        assert_eq!(progress.percent, 100);
        assert_eq!(progress.next_milestone, None);
    }

    #[test]
    fn test_completion_serializes_flat() {
        let completion = MilestoneCompletion {
            milestone: milestone(0, true),
            newly_completed: true,
        };
        let value = serde_json::to_value(&completion).unwrap();
        assert_eq!(value["milestone_id"], "form_submitted");
        assert_eq!(value["completed"], true);
        assert_eq!(value["newly_completed"], true);
    }
}
