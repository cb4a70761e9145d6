//! Lead intake and milestone timeline endpoints.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::controllers::{created, ok, require_admin};
use crate::error::{AppError, AppResult};
use crate::models::{CreateLeadRequest, LeadProgress, ListLeadsQuery};
use crate::AppState;

/// POST /api/leads — validate, persist and seed the timeline
async fn create_lead(
    state: web::Data<AppState>,
    body: web::Json<CreateLeadRequest>,
) -> AppResult<HttpResponse> {
    let new_lead = body.into_inner().validate()?;
    let created_lead = state.db.create_lead(&new_lead)?;
    Ok(created(created_lead))
}

/// GET /api/leads — operator listing, newest first
async fn list_leads(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ListLeadsQuery>,
) -> AppResult<HttpResponse> {
    require_admin(&state, &req)?;
    let leads = state.db.list_leads(query.limit(), query.offset())?;
    Ok(ok(leads))
}

/// GET /api/leads/{lead_id}
async fn get_lead(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let lead_id = path.into_inner();
    match state.db.get_lead(&lead_id)? {
        Some(lead) => Ok(ok(lead)),
        None => Err(AppError::NotFound(format!("Lead {} not found", lead_id))),
    }
}

/// GET /api/leads/{lead_id}/milestones — template order
async fn list_milestones(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let milestones = state.db.list_milestones(&path.into_inner())?;
    Ok(ok(milestones))
}

/// GET /api/leads/{lead_id}/progress
async fn get_progress(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let lead_id = path.into_inner();
    let milestones = state.db.list_milestones(&lead_id)?;
    Ok(ok(LeadProgress::from_milestones(&lead_id, &milestones)))
}

/// POST /api/leads/{lead_id}/milestones/{milestone_id}/complete — idempotent
async fn complete_milestone(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> AppResult<HttpResponse> {
    require_admin(&state, &req)?;
    let (lead_id, milestone_id) = path.into_inner();
    let completion = state.db.complete_milestone(&lead_id, &milestone_id)?;
    Ok(ok(completion))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/leads")
            .route("", web::post().to(create_lead))
            .route("", web::get().to(list_leads))
            .route("/{lead_id}", web::get().to(get_lead))
            .route("/{lead_id}/milestones", web::get().to(list_milestones))
            .route("/{lead_id}/progress", web::get().to(get_progress))
            .route(
                "/{lead_id}/milestones/{milestone_id}/complete",
                web::post().to(complete_milestone),
            ),
    );
}
