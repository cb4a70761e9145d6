use actix_web::{web, HttpRequest, HttpResponse};

use crate::controllers::{ok, require_admin};
use crate::error::AppResult;
use crate::models::{PublicMarketingSettings, UpdateMarketingSettingsRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/marketing-settings").route(web::get().to(get_public_settings)),
    );
    cfg.service(
        web::resource("/api/admin/marketing-settings")
            .route(web::get().to(get_settings))
            .route(web::put().to(update_settings)),
    );
}

/// Tracker ids for the SPA; the CAPI access token is never exposed here
async fn get_public_settings(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let settings = state.db.get_marketing_settings()?;
    Ok(ok(PublicMarketingSettings::from(settings)))
}

async fn get_settings(state: web::Data<AppState>, req: HttpRequest) -> AppResult<HttpResponse> {
    require_admin(&state, &req)?;
    Ok(ok(state.db.get_marketing_settings()?))
}

async fn update_settings(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UpdateMarketingSettingsRequest>,
) -> AppResult<HttpResponse> {
    require_admin(&state, &req)?;
    let updated = state.db.update_marketing_settings(&body.into_inner())?;
    Ok(ok(updated))
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};

    use crate::controllers::test_app::{admin_state, state, ADMIN_TOKEN};

    fn bearer() -> (actix_web::http::header::HeaderName, String) {
        (AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN))
    }

    #[actix_web::test]
    async fn test_defaults_before_first_save() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::get().uri("/api/marketing-settings").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["ga_enabled"], false);
        assert_eq!(body["data"]["fb_capi_enabled"], false);
        assert_eq!(body["data"]["ga_settings"], json!({}));
    }

    #[actix_web::test]
    async fn test_update_then_public_view_masks_token() {
        let state = admin_state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::put()
                .uri("/api/admin/marketing-settings")
                .insert_header(bearer())
                .set_json(json!({
                    "ga_enabled": true,
                    "ga_measurement_id": "G-ABC123",
                    "fb_capi_enabled": true,
                    "fb_pixel_id": "1234567890",
                    "fb_access_token": "EAAG-secret",
                    "fb_settings": {"test_event_code": "TEST42"}
                }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["fb_access_token"], "EAAG-secret");

        let resp = call_service(
            &app,
            TestRequest::get().uri("/api/marketing-settings").to_request(),
        )
        .await;
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["ga_measurement_id"], "G-ABC123");
        assert_eq!(body["data"]["fb_access_token_configured"], true);
        assert_eq!(body["data"]["fb_settings"]["test_event_code"], "TEST42");
        assert!(body["data"].get("fb_access_token").is_none());

        let resp = call_service(
            &app,
            TestRequest::get()
                .uri("/api/admin/marketing-settings")
                .insert_header(bearer())
                .to_request(),
        )
        .await;
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["fb_access_token"], "EAAG-secret");
    }

    #[actix_web::test]
    async fn test_admin_routes_reject_missing_token() {
        let state = admin_state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::put()
                .uri("/api/admin/marketing-settings")
                .set_json(json!({"ga_enabled": true}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["kind"], "unauthorized");
        assert!(!state.db.get_marketing_settings().unwrap().ga_enabled);

        let resp = call_service(
            &app,
            TestRequest::get().uri("/api/admin/marketing-settings").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_non_object_blob_rejected() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::put()
                .uri("/api/admin/marketing-settings")
                .set_json(json!({"ga_settings": [1, 2, 3]}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["kind"], "validation_error");
    }
}
