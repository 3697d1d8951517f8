use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::error;
use uuid::Uuid;

use crate::analysis::chat::{CONNECTION_TROUBLE, GREETING};
use crate::analysis::tailor::tailor_resume;
use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::state::AppState;

#[derive(Serialize)]
pub struct TailorResponse {
    pub job_id: String,
    pub markdown: String,
}

#[derive(Serialize)]
pub struct ChatSessionResponse {
    pub id: Uuid,
    pub greeting: &'static str,
}

#[derive(Deserialize)]
pub struct ChatMessageRequest {
    pub text: String,
}

fn require_llm(state: &AppState) -> Result<LlmClient, AppError> {
    state.llm.clone().ok_or_else(|| {
        AppError::Unavailable("AI features are disabled: ANTHROPIC_API_KEY is not set".to_string())
    })
}

/// POST /api/v1/jobs/:id/tailor
/// Rewrites the current resume for one job. Always 200 once the job exists; model
/// failures come back as a fixed diagnostic in `markdown`.
pub async fn handle_tailor(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TailorResponse>, AppError> {
    let llm = require_llm(&state)?;
    let job = state
        .store
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let resume_text = state.criteria.get().resume_text;
    let markdown = tailor_resume(&llm, &job, &resume_text).await;

    Ok(Json(TailorResponse {
        job_id: job.id,
        markdown,
    }))
}

/// POST /api/v1/chat/sessions
/// Opens a chat seeded with the current resume.
pub async fn handle_create_chat(
    State(state): State<AppState>,
) -> Result<Json<ChatSessionResponse>, AppError> {
    let llm = require_llm(&state)?;
    let session = state.chats.create(llm, &state.criteria.get().resume_text);
    Ok(Json(ChatSessionResponse {
        id: session.id(),
        greeting: GREETING,
    }))
}

/// POST /api/v1/chat/sessions/:id/messages
/// Streams the reply as `chunk` events followed by `done`. A failure mid-stream
/// ends with a single `error` event. 409 while the session is still replying.
pub async fn handle_chat_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatMessageRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("text must not be empty".to_string()));
    }
    let session = state
        .chats
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("Chat session {id} not found")))?;

    let reply = session.send_message_stream(text)?;

    let stream = async_stream::stream! {
        futures_util::pin_mut!(reply);
        while let Some(chunk) = reply.next().await {
            match chunk {
                Ok(text) => {
                    yield Ok(Event::default().event("chunk").data(text));
                }
                Err(e) => {
                    error!("Chat session {id} stream failed: {e}");
                    yield Ok(Event::default().event("error").data(CONNECTION_TROUBLE));
                    return;
                }
            }
        }
        yield Ok(Event::default().event("done").data(""));
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
