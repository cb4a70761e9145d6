//! Keyword chatbot for the site widget.
//!
//! Rules are plain data evaluated top to bottom; the first rule with a keyword
//! present in the message wins. Keywords match on whole words (or whole
//! phrases), case-insensitively, so "hi" does not fire on "this".

use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRule {
    pub keywords: Vec<String>,
    pub response: String,
}

/// Shape of a rules file: `{"rules": [...], "default_response": "..."}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatbotRules {
    pub rules: Vec<ChatRule>,
    pub default_response: String,
}

pub const DEFAULT_RESPONSE: &str = "Thanks for reaching out! I'm not sure I caught that. \
    You can ask me about our services, pricing, results or how to book a strategy call.";

const BUILTIN_RULES: &[(&[&str], &str)] = &[
    (
        &["hello", "hi", "hey", "good morning", "good afternoon"],
        "Hi there! I'm the agency assistant. Are you looking to grow leads, sales or brand awareness?",
    ),
    (
        &["price", "pricing", "cost", "budget", "how much", "rates"],
        "Our growth packages are tailored to your goals. Most clients invest between $2,500 and $10,000 per month. \
         Fill in the form and we'll send a custom quote.",
    ),
    (
        &["seo", "search engine", "google ranking", "organic"],
        "We run technical SEO audits, content strategy and link building to get you ranking for the searches that convert.",
    ),
    (
        &["ads", "ppc", "paid", "facebook ads", "google ads", "advertising"],
        "Our paid media team manages Google, Meta and LinkedIn campaigns with weekly optimisation and transparent reporting.",
    ),
    (
        &["social", "instagram", "tiktok", "linkedin", "content"],
        "We plan, create and publish social content that builds an audience and drives enquiries.",
    ),
    (
        &["results", "case study", "case studies", "portfolio", "examples", "testimonials"],
        "Take a look at our case studies section: recent clients have seen 3x lead volume within six months.",
    ),
    (
        &["call", "meeting", "book", "schedule", "consultation", "talk"],
        "Happy to set up a free strategy call! Submit the contact form and we'll reach out within one business day.",
    ),
    (
        &["contact", "email", "phone", "reach"],
        "You can reach us through the contact form on this page, and a strategist will get back to you within 24 hours.",
    ),
    (
        &["thanks", "thank you", "cheers"],
        "You're welcome! Anything else I can help with?",
    ),
];

/// Lowercase, keep alphanumerics, collapse everything else to single spaces,
/// and pad with spaces so phrase lookup respects word boundaries.
fn normalize(text: &str) -> String {
    let words: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect();
    format!(" {} ", words.join(" "))
}

#[derive(Debug, Clone)]
pub struct Chatbot {
    /// (normalized keywords, response) in evaluation order
    rules: Vec<(Vec<String>, String)>,
    default_response: String,
}

impl Default for Chatbot {
    fn default() -> Self {
        let rules = BUILTIN_RULES
            .iter()
            .map(|(keywords, response)| ChatRule {
                keywords: keywords.iter().map(|k| k.to_string()).collect(),
                response: response.to_string(),
            })
            .collect();
        Self::new(rules, DEFAULT_RESPONSE)
    }
}

impl Chatbot {
    pub fn new(rules: Vec<ChatRule>, default_response: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let keywords = rule
                    .keywords
                    .iter()
                    .map(|k| normalize(k))
                    .filter(|k| !k.trim().is_empty())
                    .collect();
                (keywords, rule.response)
            })
            .collect();

        Self {
            rules,
            default_response: default_response.into(),
        }
    }

    pub fn from_rules(rules: ChatbotRules) -> Self {
        Self::new(rules.rules, rules.default_response)
    }

    /// Load a replacement rule table from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read chatbot rules {:?}: {}", path, e))?;
        let rules: ChatbotRules = serde_json::from_str(&raw)
            .map_err(|e| format!("Invalid chatbot rules {:?}: {}", path, e))?;
        Ok(Self::from_rules(rules))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// First matching rule's response, or the default
    pub fn respond(&self, message: &str) -> &str {
        let message = normalize(message);
        self.rules
            .iter()
            .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k.as_str())))
            .map(|(_, response)| response.as_str())
            .unwrap_or(self.default_response.as_str())
    }
}
