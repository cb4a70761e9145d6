pub mod conversations;
pub mod health;
pub mod leads;
pub mod marketing_settings;

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::AppState;

/// Largest JSON body accepted by any endpoint
const JSON_BODY_LIMIT: usize = 64 * 1024;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self { success: true, data }
    }
}

pub fn ok<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Ok().json(ApiResponse::ok(data))
}

pub fn created<T: Serialize>(data: T) -> HttpResponse {
    HttpResponse::Created().json(ApiResponse::ok(data))
}

/// Guard for operator routes. Open when no ADMIN_API_TOKEN is configured.
pub fn require_admin(state: &web::Data<AppState>, req: &HttpRequest) -> AppResult<()> {
    let Some(expected) = state.config.admin_api_token.as_deref() else {
        return Ok(());
    };

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match header.map(|h| h.strip_prefix("Bearer ")) {
        Some(Some(token)) if constant_time_eq(token.trim(), expected) => Ok(()),
        Some(_) => Err(AppError::Unauthorized("Invalid admin token".to_string())),
        None => Err(AppError::Unauthorized(
            "No authorization token provided".to_string(),
        )),
    }
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut diff = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Malformed bodies and query strings get the same envelope as other validation errors
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(JSON_BODY_LIMIT)
        .error_handler(|err, _req| AppError::Validation(format!("Invalid JSON body: {}", err)).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into())
}

/// Register every API route
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .configure(health::config)
        .configure(leads::config)
        .configure(conversations::config)
        .configure(marketing_settings::config);
}


#[cfg(test)]
mod tests {
    use super::test_app::{admin_state, state, ADMIN_TOKEN};
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn test_envelope_shape() {
        let value = serde_json::to_value(ApiResponse::ok(vec![1, 2])).unwrap();
        assert_eq!(value, serde_json::json!({"success": true, "data": [1, 2]}));
    }

    #[test]
    fn test_admin_open_without_token() {
        let state = state();
        let req = TestRequest::default().to_http_request();
        assert!(require_admin(&state, &req).is_ok());
    }

    #[test]
    fn test_admin_token_checked() {
        let state = admin_state();

        let req = TestRequest::default().to_http_request();
        assert!(matches!(require_admin(&state, &req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer wrong"))
            .to_http_request();
        assert!(matches!(require_admin(&state, &req), Err(AppError::Unauthorized(_))));

        let req = TestRequest::default()
            .insert_header((AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN)))
            .to_http_request();
        assert!(require_admin(&state, &req).is_ok());
    }

    #[test]
    fn test_admin_token_needs_single_bearer_prefix() {
        let state = admin_state();

        for header in [
            ADMIN_TOKEN.to_string(),
            format!("Bearer Bearer {}", ADMIN_TOKEN),
            format!("bearer{}", ADMIN_TOKEN),
        ] {
            let req = TestRequest::default()
                .insert_header((AUTHORIZATION, header.clone()))
                .to_http_request();
            assert!(
                matches!(require_admin(&state, &req), Err(AppError::Unauthorized(_))),
                "accepted {:?}",
                header
            );
        }
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq("s3cret", "s3cret"));
        assert!(!constant_time_eq("s3cret", "s3creT"));
        assert!(!constant_time_eq("s3cret", "s3cret-admin"));
        assert!(!constant_time_eq("", "a"));
    }
}
