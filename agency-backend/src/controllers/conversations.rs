//! Chatbot transcript endpoints.
//!
//! `/api/chat` is what the site widget calls: it logs the visitor message,
//! picks a canned reply and logs that too, in one transaction.

use actix_web::{web, HttpResponse};

use crate::controllers::{created, ok};
use crate::error::AppResult;
use crate::models::conversation::validate_visitor_id;
use crate::models::{AppendTurnRequest, ChatExchange, ChatRequest, NewTurn};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/conversations")
            .route("", web::post().to(append_turn))
            .route("/{visitor_id}", web::get().to(get_transcript)),
    );
    cfg.service(web::resource("/api/chat").route(web::post().to(chat)));
}

async fn append_turn(
    state: web::Data<AppState>,
    body: web::Json<AppendTurnRequest>,
) -> AppResult<HttpResponse> {
    let turn = NewTurn::try_from(body.into_inner())?;
    let stored = state.db.append_turn(&turn)?;
    Ok(created(stored))
}

async fn get_transcript(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let visitor_id = validate_visitor_id(&path.into_inner())?;
    let transcript = state.db.get_transcript(&visitor_id)?;
    Ok(ok(transcript))
}

async fn chat(
    state: web::Data<AppState>,
    body: web::Json<ChatRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let visitor = NewTurn::new(req.visitor_id, req.message, false)?;
    let reply = state.chatbot.respond(&visitor.message).to_string();
    let bot = NewTurn {
        visitor_id: visitor.visitor_id.clone(),
        message: reply,
        is_bot: true,
    };

    let (visitor_turn, bot_turn) = state.db.append_exchange(&visitor, &bot)?;
    log::debug!("Chat reply logged for visitor {}", visitor_turn.visitor_id);
    Ok(ok(ChatExchange {
        visitor_turn,
        bot_turn,
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use actix_web::test::{call_service, read_body_json, TestRequest};
    use serde_json::{json, Value};

    use crate::chatbot::DEFAULT_RESPONSE;
    use crate::controllers::test_app::state;

    #[actix_web::test]
    async fn test_append_and_read_transcript() {
        let state = state();
        let app = crate::test_service!(state);

        for (message, is_bot) in [("Hello", false), ("Hi there!", true)] {
            let resp = call_service(
                &app,
                TestRequest::post()
                    .uri("/api/conversations")
                    .set_json(json!({"visitor_id": "v-42", "message": message, "is_bot": is_bot}))
                    .to_request(),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::CREATED);
        }

        let resp = call_service(
            &app,
            TestRequest::get().uri("/api/conversations/v-42").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        let turns = body["data"].as_array().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0]["message"], "Hello");
        assert_eq!(turns[0]["is_bot"], false);
        assert_eq!(turns[1]["message"], "Hi there!");
        assert_eq!(turns[1]["is_bot"], true);
    }

    #[actix_web::test]
    async fn test_unknown_visitor_has_empty_transcript() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::get().uri("/api/conversations/nobody").to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"], json!([]));
    }

    #[actix_web::test]
    async fn test_blank_message_rejected() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/conversations")
                .set_json(json!({"visitor_id": "v-1", "message": "   ", "is_bot": false}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["kind"], "validation_error");
        assert!(state.db.get_transcript("v-1").unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_chat_logs_both_turns() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/chat")
                .set_json(json!({"visitor_id": "v-7", "message": "What does SEO cost?"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["visitor_turn"]["message"], "What does SEO cost?");
        assert_eq!(body["data"]["bot_turn"]["is_bot"], true);
        let reply = body["data"]["bot_turn"]["message"].as_str().unwrap();
        assert!(reply.contains("custom quote"));

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/chat")
                .set_json(json!({"visitor_id": "v-7", "message": "zzz"}))
                .to_request(),
        )
        .await;
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["data"]["bot_turn"]["message"], DEFAULT_RESPONSE);

        let transcript = state.db.get_transcript("v-7").unwrap();
        assert_eq!(transcript.len(), 4);
        let bot_flags: Vec<bool> = transcript.iter().map(|t| t.is_bot).collect();
        assert_eq!(bot_flags, vec![false, true, false, true]);
    }

    #[actix_web::test]
    async fn test_chat_requires_visitor_id() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/chat")
                .set_json(json!({"message": "hello"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_append_without_bot_flag_rejected() {
        let state = state();
        let app = crate::test_service!(state);

        let resp = call_service(
            &app,
            TestRequest::post()
                .uri("/api/conversations")
                .set_json(json!({"visitor_id": "v-9", "message": "Thanks, talk soon"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = read_body_json(resp).await;
        assert_eq!(body["error"]["kind"], "validation_error");
        assert!(body["error"]["message"].as_str().unwrap().contains("is_bot"));
        assert!(state.db.get_transcript("v-9").unwrap().is_empty());
    }
}
