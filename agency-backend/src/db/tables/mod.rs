//! Database model modules - extends Database with domain-specific methods
//!
//! Each module adds `impl Database` blocks with methods for a specific table group.

mod conversations;      // conversations (chatbot transcript)
mod leads;              // leads
mod marketing_settings; // marketing_settings
mod milestones;         // lead_milestones
