use actix_web::{web, HttpResponse};

use crate::controllers::ok;
use crate::error::AppResult;
use crate::AppState;

/// Version from Cargo.toml, available at compile time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/health").route(web::get().to(health_check)));
    cfg.service(web::resource("/api/version").route(web::get().to(get_version)));
    cfg.service(web::resource("/api/health/config").route(web::get().to(get_config_status)));
}

/// Liveness plus a round trip to the database
async fn health_check(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let leads = state.db.count_leads()?;
    Ok(ok(serde_json::json!({
        "status": "ok",
        "version": VERSION,
        "leads": leads
    })))
}

async fn get_version() -> HttpResponse {
    ok(serde_json::json!({ "version": VERSION }))
}

async fn get_config_status(state: web::Data<AppState>) -> HttpResponse {
    ok(serde_json::json!({
        "admin_auth_enabled": state.config.admin_api_token.is_some(),
        "frontend_served": state.config.frontend_dist.is_some(),
        "chatbot_rules": state.chatbot.rule_count()
    }))
}
