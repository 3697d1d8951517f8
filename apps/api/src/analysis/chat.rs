//! Career assistant chat sessions.
//!
//! A session keeps the conversation history and a system instruction seeded with
//! the resume. `send_message_stream` returns a lazy stream of reply chunks; the
//! exchange is committed to history only once the reply has been fully received,
//! so a consumer that stops early leaves the history untouched. A session runs
//! one exchange at a time; a send while a reply is still streaming is refused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use futures_util::{Stream, StreamExt};
use uuid::Uuid;

use crate::analysis::prompts::CHAT_SYSTEM_TEMPLATE;
use crate::errors::AppError;
use crate::llm_client::prompts::render;
use crate::llm_client::{LlmClient, LlmError, Message};

pub const GREETING: &str = "Hello! I'm your AI Career Scout. I have your resume loaded. \
    How can I help you navigate your search today?";

pub const CONNECTION_TROUBLE: &str =
    "I'm having trouble connecting right now. Please try again.";

pub struct ChatSession {
    id: Uuid,
    system: String,
    history: Arc<Mutex<Vec<Message>>>,
    exchanging: Arc<AtomicBool>,
    llm: LlmClient,
}

/// Held by a reply stream for its whole life. Dropping it frees the session.
struct ExchangeGuard {
    exchanging: Arc<AtomicBool>,
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        self.exchanging.store(false, Ordering::SeqCst);
    }
}

impl ChatSession {
    pub fn new(llm: LlmClient, resume_text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            system: render(CHAT_SYSTEM_TEMPLATE, &[("resume", resume_text)]),
            history: Arc::new(Mutex::new(Vec::new())),
            exchanging: Arc::new(AtomicBool::new(false)),
            llm,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Completed exchanges, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Sends `text` and streams the reply. Not restartable: each call is one exchange.
    /// Fails with `Conflict` while a previous reply stream is still alive.
    pub fn send_message_stream(
        &self,
        text: &str,
    ) -> Result<impl Stream<Item = Result<String, LlmError>> + Send + 'static, AppError> {
        self.exchanging
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| {
                AppError::Conflict(format!("Chat session {} is already replying", self.id))
            })?;
        let exchange = ExchangeGuard {
            exchanging: Arc::clone(&self.exchanging),
        };

        let user_turn = Message::user(text);
        let mut messages = self.history();
        messages.push(user_turn.clone());

        let upstream = self.llm.stream_messages(self.system.clone(), messages, None);
        let history = Arc::clone(&self.history);

        Ok(async_stream::stream! {
            let _exchange = exchange;
            futures_util::pin_mut!(upstream);
            let mut reply = String::new();

            while let Some(chunk) = upstream.next().await {
                match chunk {
                    Ok(text) => {
                        reply.push_str(&text);
                        yield Ok(text);
                    }
                    Err(e) => {
                        yield Err(e);
                        return;
                    }
                }
            }

            let mut committed = history.lock().unwrap_or_else(|e| e.into_inner());
            committed.push(user_turn);
            committed.push(Message::assistant(reply));
        })
    }
}

/// Live chat sessions keyed by id. Sessions last for the process lifetime.
#[derive(Default)]
pub struct ChatRegistry {
    sessions: RwLock<HashMap<Uuid, Arc<ChatSession>>>,
}

impl ChatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, llm: LlmClient, resume_text: &str) -> Arc<ChatSession> {
        let session = Arc::new(ChatSession::new(llm, resume_text));
        self.sessions
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(session.id(), Arc::clone(&session));
        session
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<ChatSession>> {
        self.sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .cloned()
    }
}
