//! Chat orchestrator: recognizer, dialog manager and session table wired
//! into a single turn-handling entry point.
//!
//! Each session owns a [`DialogContext`] behind its own async mutex, so
//! turns within one conversation run one at a time while different
//! conversations proceed in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bandejao_core::config::{BandejaoConfig, ChatConfig};
use bandejao_core::{
    DialogContext, Intent, IntentRecognitionResult, McpResponse, PendingClarification,
    RecognitionContext, ResponseMetadata, ResponseType, Timestamp,
};
use bandejao_nlu::IntentRecognizer;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ChatError;
use crate::response::DialogManager;

type SharedContext = Arc<AsyncMutex<DialogContext>>;

/// External answer source consulted when recognition confidence is low.
#[async_trait]
pub trait LlmFallback: Send + Sync {
    /// Produce a free-text answer for `message`.
    async fn complete(&self, message: &str, context: &DialogContext) -> Result<String, ChatError>;
}

/// Everything produced for one user message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub recognition: IntentRecognitionResult,
    pub response: McpResponse,
}

/// Central coordinator for recognition, dialog and sessions.
pub struct ChatOrchestrator {
    recognizer: IntentRecognizer,
    dialog: DialogManager,
    llm: Option<Arc<dyn LlmFallback>>,
    sessions: Mutex<HashMap<Uuid, SharedContext>>,
    config: ChatConfig,
}

impl ChatOrchestrator {
    pub fn new(recognizer: IntentRecognizer, dialog: DialogManager, config: ChatConfig) -> Self {
        Self {
            recognizer,
            dialog,
            llm: None,
            sessions: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Build recognizer and dialog manager from a loaded config.
    pub fn from_config(config: &BandejaoConfig) -> Result<Self, ChatError> {
        let recognizer = IntentRecognizer::from_config(config)?;
        let dialog = DialogManager::from_config(config)?;
        info!(
            patterns = recognizer.len(),
            templates = dialog.template_count(),
            "Chat orchestrator ready"
        );
        Ok(Self::new(recognizer, dialog, config.chat.clone()))
    }

    /// Attach an LLM consulted for low-confidence fallbacks.
    pub fn with_llm_fallback(mut self, llm: Arc<dyn LlmFallback>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn recognizer(&self) -> &IntentRecognizer {
        &self.recognizer
    }

    pub fn recognizer_mut(&mut self) -> &mut IntentRecognizer {
        &mut self.recognizer
    }

    pub fn dialog(&self) -> &DialogManager {
        &self.dialog
    }

    pub fn dialog_mut(&mut self) -> &mut DialogManager {
        &mut self.dialog
    }

    // -----------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------

    /// Handle one message against a caller-owned context.
    ///
    /// A pending clarification is answered by the message itself when it
    /// is not recognized as another intent: the message fills the pending
    /// slot and the pending intent is answered again. A message recognized
    /// as a different intent drops the clarification and is answered on its
    /// own. The context's bookkeeping fields are updated afterwards.
    pub async fn handle_turn(
        &self,
        message: &str,
        context: &mut DialogContext,
    ) -> Result<ChatTurn, ChatError> {
        self.validate(message)?;
        Ok(self.run_turn(message, context).await)
    }

    /// Handle one message in a server-side session.
    ///
    /// Unknown or expired session ids start a new session. Returns the
    /// turn and the id of the session it ran in.
    pub async fn handle_message(
        &self,
        message: &str,
        session_id: Option<Uuid>,
    ) -> Result<(ChatTurn, Uuid), ChatError> {
        self.validate(message)?;
        let (sid, session) = self.resolve_session(session_id)?;
        let mut context = session.lock().await;
        let turn = self.run_turn(message, &mut context).await;
        Ok((turn, sid))
    }

    async fn run_turn(&self, message: &str, context: &mut DialogContext) -> ChatTurn {
        let recognition = self
            .recognizer
            .recognize(message, Some(&RecognitionContext::from(&*context)));

        let (intent, confidence) = match context.pending.take() {
            // Below-threshold recognitions come back as Unknown.
            Some(pending)
                if recognition.intent == Intent::Unknown || recognition.intent == pending.intent =>
            {
                let value = message.trim();
                if !value.is_empty() {
                    debug!(intent = %pending.intent, slot = %pending.slot, "Filling pending slot");
                    context.fill_slot(&pending.slot, value);
                }
                (pending.intent, self.dialog.clarification_confidence())
            }
            Some(pending) => {
                debug!(
                    pending = %pending.intent,
                    intent = %recognition.intent,
                    "Topic changed, dropping pending clarification"
                );
                (recognition.intent.clone(), recognition.confidence)
            }
            None => (recognition.intent.clone(), recognition.confidence),
        };

        let mut response = self.dialog.generate_response(&intent, context, confidence).await;

        if response.response_type == ResponseType::Error
            && recognition.confidence < self.config.llm_fallback_threshold
        {
            if let Some(llm) = &self.llm {
                response = self.consult_llm(llm.as_ref(), message, context, response).await;
            }
        }

        context.pending = match (&response.response_type, &response.metadata.missing_slots) {
            (ResponseType::Clarification, Some(missing)) => {
                missing.first().map(|slot| PendingClarification {
                    intent: intent.clone(),
                    slot: slot.clone(),
                })
            }
            _ => None,
        };
        context.previous_intent = Some(intent);
        context.turn_count = context.turn_count.saturating_add(1);
        context.updated_at = Timestamp::now();

        ChatTurn {
            recognition,
            response,
        }
    }

    async fn consult_llm(
        &self,
        llm: &dyn LlmFallback,
        message: &str,
        context: &DialogContext,
        fallback: McpResponse,
    ) -> McpResponse {
        let limit = Duration::from_millis(self.config.llm_timeout_ms);
        let error = match tokio::time::timeout(limit, llm.complete(message, context)).await {
            Ok(Ok(text)) if !text.trim().is_empty() => {
                debug!("LLM fallback answered");
                return McpResponse {
                    text,
                    response_type: ResponseType::DirectAnswer,
                    metadata: ResponseMetadata {
                        llm_used: true,
                        ..fallback.metadata
                    },
                    ..fallback
                };
            }
            Ok(Ok(_)) => ChatError::Llm("empty completion".to_string()),
            Ok(Err(e)) => e,
            Err(_) => ChatError::LlmTimeout(self.config.llm_timeout_ms),
        };
        warn!("LLM fallback failed, keeping fallback response: {}", error);
        fallback
    }

    fn validate(&self, message: &str) -> Result<(), ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }
        if message.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }
        Ok(())
    }

    // -----------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------

    /// Snapshot of a session's dialog context.
    pub async fn get_session(&self, session_id: Uuid) -> Option<DialogContext> {
        let session = self.sessions.lock().ok()?.get(&session_id).cloned()?;
        let context = session.lock().await;
        Some(context.clone())
    }

    /// Delete a session by id.
    pub fn delete_session(&self, session_id: Uuid) -> Result<(), ChatError> {
        let mut sessions = self.lock_sessions()?;
        match sessions.remove(&session_id) {
            Some(_) => Ok(()),
            None => Err(ChatError::SessionNotFound(session_id)),
        }
    }

    /// Drop every idle session past the timeout. Returns how many were removed.
    pub fn purge_expired(&self) -> Result<usize, ChatError> {
        let mut sessions = self.lock_sessions()?;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session));
        let purged = before - sessions.len();
        if purged > 0 {
            info!(purged, "Purged expired chat sessions");
        }
        Ok(purged)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }

    // -- Private helpers --

    fn lock_sessions(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, SharedContext>>, ChatError> {
        self.sessions.lock().map_err(|e| {
            warn!("Session lock poisoned: {}", e);
            ChatError::Storage(format!("session lock poisoned: {}", e))
        })
    }

    /// Resolve or create a session.
    fn resolve_session(&self, requested: Option<Uuid>) -> Result<(Uuid, SharedContext), ChatError> {
        let mut sessions = self.lock_sessions()?;

        if let Some(sid) = requested {
            if let Some(session) = sessions.get(&sid) {
                if !self.is_expired(session) {
                    return Ok((sid, Arc::clone(session)));
                }
                debug!(session_id = %sid, "Session expired, starting a new one");
                sessions.remove(&sid);
            }
        }

        let context = DialogContext::new();
        let sid = context.conversation_id;
        let session = Arc::new(AsyncMutex::new(context));
        sessions.insert(sid, Arc::clone(&session));
        debug!(session_id = %sid, "Created chat session");
        Ok((sid, session))
    }

    /// A session with a turn in flight is never expired.
    fn is_expired(&self, session: &SharedContext) -> bool {
        let timeout_secs = i64::from(self.config.session_timeout_minutes) * 60;
        match session.try_lock() {
            Ok(context) => context.updated_at.elapsed_secs() > timeout_secs,
            Err(_) => false,
        }
    }
}
