use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub const MAX_VISITOR_ID_LEN: usize = 128;
pub const MAX_TURN_MESSAGE_LEN: usize = 4000;

/// One chatbot message, from the visitor or the bot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub id: i64,
    pub visitor_id: String,
    pub message: String,
    pub is_bot: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppendTurnRequest {
    pub visitor_id: Option<String>,
    pub message: Option<String>,
    /// Required so a bot reply is never logged as the visitor's message
    pub is_bot: Option<bool>,
}

/// Visitor message sent to the chatbot
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub visitor_id: Option<String>,
    pub message: Option<String>,
}

/// Both sides of one chatbot exchange, as logged
#[derive(Debug, Clone, Serialize)]
pub struct ChatExchange {
    pub visitor_turn: ConversationTurn,
    pub bot_turn: ConversationTurn,
}

/// Validated turn ready to be appended
#[derive(Debug, Clone, PartialEq)]
pub struct NewTurn {
    pub visitor_id: String,
    pub message: String,
    pub is_bot: bool,
}

impl NewTurn {
    pub fn new(visitor_id: Option<String>, message: Option<String>, is_bot: bool) -> AppResult<Self> {
        let visitor_id = validate_visitor_id(visitor_id.as_deref().unwrap_or_default())?;

        // Message text is kept as sent; only blank is rejected
        let message = message.unwrap_or_default();
        if message.trim().is_empty() {
            return Err(AppError::Validation("message must not be empty".to_string()));
        }
        if message.chars().count() > MAX_TURN_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "message must be at most {} characters",
                MAX_TURN_MESSAGE_LEN
            )));
        }

        Ok(Self {
            visitor_id,
            message,
            is_bot,
        })
    }
}

impl TryFrom<AppendTurnRequest> for NewTurn {
    type Error = AppError;

    fn try_from(req: AppendTurnRequest) -> AppResult<Self> {
        let is_bot = req
            .is_bot
            .ok_or_else(|| AppError::Validation("is_bot is required".to_string()))?;
        NewTurn::new(req.visitor_id, req.message, is_bot)
    }
}

pub fn validate_visitor_id(visitor_id: &str) -> AppResult<String> {
    let visitor_id = visitor_id.trim();
    if visitor_id.is_empty() {
        return Err(AppError::Validation("visitor_id is required".to_string()));
    }
    if visitor_id.chars().count() > MAX_VISITOR_ID_LEN {
        return Err(AppError::Validation(format!(
            "visitor_id must be at most {} characters",
            MAX_VISITOR_ID_LEN
        )));
    }
    Ok(visitor_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_validation() {
        let turn = NewTurn::new(Some(" v-1 ".into()), Some("Hi there".into()), false).unwrap();
        assert_eq!(turn.visitor_id, "v-1");
        assert_eq!(turn.message, "Hi there");

        assert!(NewTurn::new(None, Some("hi".into()), false).is_err());
        assert!(NewTurn::new(Some("v-1".into()), Some("   ".into()), true).is_err());
        assert!(NewTurn::new(Some("v-1".into()), None, true).is_err());
        assert!(NewTurn::new(Some("x".repeat(MAX_VISITOR_ID_LEN + 1)), Some("hi".into()), false).is_err());
    }

    #[test]
    fn test_is_bot_is_required() {
        let req: AppendTurnRequest =
            serde_json::from_str(r#"{"visitor_id": "v-1", "message": "hello"}"#).unwrap();
        assert!(matches!(NewTurn::try_from(req), Err(AppError::Validation(_))));

        let req: AppendTurnRequest =
            serde_json::from_str(r#"{"visitor_id": "v-1", "message": "hello", "is_bot": true}"#).unwrap();
        assert!(NewTurn::try_from(req).unwrap().is_bot);
    }
}
