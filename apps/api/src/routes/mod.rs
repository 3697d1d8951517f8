pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::criteria::handlers as criteria;
use crate::scouting::handlers as scouting;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Criteria
        .route(
            "/api/v1/criteria",
            get(criteria::handle_get_criteria).put(criteria::handle_put_criteria),
        )
        // Scouting
        .route("/api/v1/scout", post(scouting::handle_launch))
        .route("/api/v1/scout/cancel", post(scouting::handle_cancel))
        .route("/api/v1/scout/status", get(scouting::handle_status))
        .route(
            "/api/v1/jobs",
            get(scouting::handle_list_jobs).delete(scouting::handle_clear_jobs),
        )
        .route("/api/v1/jobs/stream", get(scouting::handle_job_stream))
        .route("/api/v1/jobs/:id", get(scouting::handle_get_job))
        // Analysis
        .route("/api/v1/jobs/:id/tailor", post(analysis::handle_tailor))
        .route("/api/v1/chat/sessions", post(analysis::handle_create_chat))
        .route(
            "/api/v1/chat/sessions/:id/messages",
            post(analysis::handle_chat_message),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm_client::test_support::client_for;
    use crate::llm_client::LlmClient;
    use crate::models::job::SearchCriteria;
    use crate::scouting::generator::generate_mock_job;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn state(llm: Option<LlmClient>) -> AppState {
        AppState::new(&Config::default(), llm)
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, String) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn seed_job(state: &AppState) -> String {
        let criteria = SearchCriteria {
            job_title: "Solutions Architect".to_string(),
            location: String::new(),
            is_remote: true,
            resume_text: String::new(),
        };
        let job = generate_mock_job(&criteria, &mut StdRng::seed_from_u64(11));
        let id = job.id.clone();
        state.store.prepend(job);
        id
    }

    #[tokio::test]
    async fn test_health_reports_ai_disabled_without_key() {
        let (status, body) = send(build_router(state(None)), "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["ai_enabled"], false);
    }

    #[tokio::test]
    async fn test_criteria_round_trip_through_put() {
        let state = state(None);
        let (status, _) = send(
            build_router(state.clone()),
            "PUT",
            "/api/v1/criteria",
            Some(json!({ "job_title": "  Product Lead ", "is_remote": false, "resume_text": "cv" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(build_router(state), "GET", "/api/v1/criteria", None).await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["job_title"], "Product Lead");
        assert_eq!(json["location"], "");
        assert_eq!(json["is_remote"], false);
    }

    #[tokio::test]
    async fn test_jobs_list_includes_stats() {
        let state = state(None);
        seed_job(&state);

        let (status, body) = send(build_router(state), "GET", "/api/v1/jobs", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["stats"]["total"], 1);
        assert_eq!(json["stats"]["high_fit"], 0);
        assert_eq!(json["stats"]["in_flight"], 1);
        assert_eq!(json["jobs"][0]["status"], "scraped");
    }

    #[tokio::test]
    async fn test_clear_jobs_empties_collection() {
        let state = state(None);
        seed_job(&state);

        let (status, _) = send(build_router(state.clone()), "DELETE", "/api/v1/jobs", None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.store.get().is_empty());
    }

    #[tokio::test]
    async fn test_job_detail_includes_search_url() {
        let state = state(None);
        let id = seed_job(&state);

        let (status, body) = send(build_router(state), "GET", &format!("/api/v1/jobs/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["job"]["id"], id.as_str());
        assert!(json["search_url"]
            .as_str()
            .unwrap()
            .starts_with("https://www.google.com/search?q=Solutions%20Architect%20"));

        let bands = json["compensation"].as_array().unwrap();
        assert_eq!(bands.len(), 6);
        assert_eq!(bands[0]["level"], "Junior");
        assert_eq!(bands[5]["level"], "Principal");
        let role: Vec<_> = bands.iter().filter(|b| b["is_this_role"] == true).collect();
        assert_eq!(role.len(), 1);
        let min = json["job"]["salary_min"].as_u64().unwrap();
        let max = json["job"]["salary_max"].as_u64().unwrap();
        assert_eq!(role[0]["salary"].as_u64().unwrap(), (min + max) / 2);
        let salaries: Vec<_> = bands.iter().map(|b| b["salary"].as_u64().unwrap()).collect();
        assert!(salaries.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_job_stream_starts_with_current_snapshot() {
        use futures_util::StreamExt;

        let state = state(None);
        let id = seed_job(&state);

        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/api/v1/jobs/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let mut body = response.into_body().into_data_stream();
        let first = body.next().await.unwrap().unwrap();
        let frame = String::from_utf8(first.to_vec()).unwrap();
        assert!(frame.starts_with("event: snapshot\n"));
        assert!(frame.contains(&id));
    }

    #[tokio::test]
    async fn test_unknown_job_is_404_with_error_body() {
        let (status, body) = send(build_router(state(None)), "GET", "/api/v1/jobs/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_ai_routes_unavailable_without_key() {
        let state = state(None);
        let id = seed_job(&state);

        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/api/v1/jobs/{id}/tailor"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = send(build_router(state), "POST", "/api/v1/chat/sessions", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_launch_conflicts_while_active() {
        let state = state(None);

        let (status, body) = send(build_router(state.clone()), "POST", "/api/v1/scout", None).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["batch_size"], 5);

        let (status, body) = send(build_router(state.clone()), "POST", "/api/v1/scout", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("CONFLICT"));

        let (_, body) = send(build_router(state.clone()), "GET", "/api/v1/scout/status", None).await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["active"], true);

        let (_, body) = send(build_router(state), "POST", "/api/v1/scout/cancel", None).await;
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["cancelled"], true);
    }

    #[tokio::test]
    async fn test_chat_message_streams_chunks_then_done() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(concat!(
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Apply to \"}}\n\n",
                "data: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"CloudScale.\"}}\n\n",
                "data: {\"type\":\"message_stop\"}\n\n",
            ))
            .create_async()
            .await;
        let state = state(Some(client_for(&server)));

        let (status, body) = send(build_router(state.clone()), "POST", "/api/v1/chat/sessions", None).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["greeting"].as_str().unwrap().starts_with("Hello!"));
        let id = json["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            build_router(state.clone()),
            "POST",
            &format!("/api/v1/chat/sessions/{id}/messages"),
            Some(json!({ "text": "Where should I apply?" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("event: chunk\ndata: Apply to \n"));
        assert!(body.contains("event: chunk\ndata: CloudScale.\n"));
        assert!(body.contains("event: done"));

        let session = state.chats.get(id.parse().unwrap()).unwrap();
        assert_eq!(session.history().len(), 2);
    }

    #[tokio::test]
    async fn test_chat_stream_error_reports_connection_trouble() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body("overloaded")
            .create_async()
            .await;
        let state = state(Some(client_for(&server)));
        let session = state.chats.create(client_for(&server), "resume");

        let (status, body) = send(
            build_router(state),
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", session.id()),
            Some(json!({ "text": "hello" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("event: error"));
        assert!(body.contains("trouble connecting"));
        assert!(!body.contains("event: done"));
    }

    #[tokio::test]
    async fn test_chat_message_conflicts_while_reply_streaming() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/v1/messages").expect(0).create_async().await;
        let state = state(Some(client_for(&server)));
        let session = state.chats.create(client_for(&server), "resume");
        let _pending = session.send_message_stream("first").unwrap();

        let (status, body) = send(
            build_router(state),
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", session.id()),
            Some(json!({ "text": "second" })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body.contains("CONFLICT"));
    }

    #[tokio::test]
    async fn test_chat_rejects_blank_message_and_unknown_session() {
        let mut server = mockito::Server::new_async().await;
        server.mock("POST", "/v1/messages").expect(0).create_async().await;
        let state = state(Some(client_for(&server)));
        let session = state.chats.create(client_for(&server), "resume");

        let (status, _) = send(
            build_router(state.clone()),
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", session.id()),
            Some(json!({ "text": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            build_router(state),
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", uuid::Uuid::new_v4()),
            Some(json!({ "text": "hi" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
