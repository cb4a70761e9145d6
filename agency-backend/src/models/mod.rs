pub mod conversation;
pub mod lead;
pub mod marketing_settings;
pub mod milestone;

pub use conversation::{AppendTurnRequest, ChatExchange, ChatRequest, ConversationTurn, NewTurn};
pub use lead::{CreateLeadRequest, Lead, LeadWithMilestones, ListLeadsQuery, NewLead};
pub use marketing_settings::{MarketingSettings, PublicMarketingSettings, UpdateMarketingSettingsRequest};
pub use milestone::{
    LeadProgress, Milestone, MilestoneCompletion, MilestoneTemplate, MILESTONE_TEMPLATES,
};
