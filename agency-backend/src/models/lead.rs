use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use super::Milestone;

pub const MAX_CONTACT_FIELD_LEN: usize = 200;
pub const MAX_QUALIFICATION_FIELD_LEN: usize = 500;
pub const MAX_MESSAGE_LEN: usize = 5000;

/// Default page size for the operator lead listing
pub const DEFAULT_LEAD_PAGE_SIZE: u32 = 50;
pub const MAX_LEAD_PAGE_SIZE: u32 = 200;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Digits with an optional leading +, plus the usual separators
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9 ().-]+$").expect("phone regex"));

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// A submitted lead, as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub business_type: Option<String>,
    pub company_size: Option<String>,
    pub annual_revenue: Option<String>,
    pub client_value: Option<String>,
    pub marketing_needs: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lead plus its seeded timeline, returned from intake
#[derive(Debug, Clone, Serialize)]
pub struct LeadWithMilestones {
    #[serde(flatten)]
    pub lead: Lead,
    pub milestones: Vec<Milestone>,
}

/// Raw intake body. Every field is optional at the serde level so a missing
/// required field is reported as a validation error instead of a parse failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateLeadRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub business_type: Option<String>,
    pub company_size: Option<String>,
    pub annual_revenue: Option<String>,
    pub client_value: Option<String>,
    pub marketing_needs: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
}

/// A validated, normalised lead ready to be persisted
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub name: String,
    pub email: String,
    pub company: String,
    pub phone: String,
    pub business_type: Option<String>,
    pub company_size: Option<String>,
    pub annual_revenue: Option<String>,
    pub client_value: Option<String>,
    pub marketing_needs: Option<String>,
    pub timeline: Option<String>,
    pub budget: Option<String>,
    pub source: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ListLeadsQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ListLeadsQuery {
    pub fn limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_LEAD_PAGE_SIZE)
            .clamp(1, MAX_LEAD_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// Collects every field problem so the form can show them all at once
#[derive(Default)]
struct FieldErrors(Vec<String>);

impl FieldErrors {
    fn required(&mut self, field: &str, value: Option<String>) -> String {
        match clean(value) {
            Some(v) if v.chars().count() > MAX_CONTACT_FIELD_LEN => {
                self.0.push(format!("{} must be at most {} characters", field, MAX_CONTACT_FIELD_LEN));
                v
            }
            Some(v) => v,
            None => {
                self.0.push(format!("{} is required", field));
                String::new()
            }
        }
    }

    fn optional(&mut self, field: &str, value: Option<String>, max_len: usize) -> Option<String> {
        let value = clean(value)?;
        if value.chars().count() > max_len {
            self.0.push(format!("{} must be at most {} characters", field, max_len));
        }
        Some(value)
    }

    fn into_result(self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0.join("; ")))
        }
    }
}

/// Trim, and treat blank as absent
fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn is_valid_phone(phone: &str) -> bool {
    if !PHONE_RE.is_match(phone) {
        return false;
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits)
}

impl CreateLeadRequest {
    pub fn validate(self) -> AppResult<NewLead> {
        let mut errors = FieldErrors::default();

        let name = errors.required("name", self.name);
        let email = errors.required("email", self.email).to_lowercase();
        let company = errors.required("company", self.company);
        let phone = errors.required("phone", self.phone);

        if !email.is_empty() && !is_valid_email(&email) {
            errors.0.push("email is not a valid email address".to_string());
        }
        if !phone.is_empty() && !is_valid_phone(&phone) {
            errors.0.push("phone is not a valid phone number".to_string());
        }

        let max = MAX_QUALIFICATION_FIELD_LEN;
        let lead = NewLead {
            name,
            email,
            company,
            phone,
            business_type: errors.optional("business_type", self.business_type, max),
            company_size: errors.optional("company_size", self.company_size, max),
            annual_revenue: errors.optional("annual_revenue", self.annual_revenue, max),
            client_value: errors.optional("client_value", self.client_value, max),
            marketing_needs: errors.optional("marketing_needs", self.marketing_needs, max),
            timeline: errors.optional("timeline", self.timeline, max),
            budget: errors.optional("budget", self.budget, max),
            source: errors.optional("source", self.source, max),
            message: errors.optional("message", self.message, MAX_MESSAGE_LEN),
        };

        errors.into_result()?;
        Ok(lead)
    }
}
