//! Error types for the chat surface.
//!
//! Dialog generation itself never fails; these cover request validation,
//! session bookkeeping and the optional LLM fallback.

use bandejao_core::error::BandejaoError;
use bandejao_nlu::NluError;

/// Errors from the chat orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(uuid::Uuid),
    #[error("LLM error: {0}")]
    Llm(String),
    #[error("LLM call timed out after {0} ms")]
    LlmTimeout(u64),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Nlu(#[from] NluError),
    #[error(transparent)]
    Core(#[from] BandejaoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::Disabled.to_string(), "chat is disabled");
        assert_eq!(
            ChatError::MessageTooLong(2000).to_string(),
            "message exceeds maximum length of 2000 characters"
        );
        assert_eq!(
            ChatError::Llm("model not loaded".to_string()).to_string(),
            "LLM error: model not loaded"
        );
        assert_eq!(
            ChatError::LlmTimeout(5000).to_string(),
            "LLM call timed out after 5000 ms"
        );
        assert_eq!(
            ChatError::Storage("session lock poisoned".to_string()).to_string(),
            "storage error: session lock poisoned"
        );
    }

    #[test]
    fn test_session_not_found_preserves_uuid() {
        let id = Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            ChatError::SessionNotFound(id).to_string(),
            "session not found: 550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[test]
    fn test_from_core_error_is_transparent() {
        let err: ChatError = BandejaoError::Config("bad toml".to_string()).into();
        assert!(matches!(err, ChatError::Core(_)));
        assert_eq!(err.to_string(), "Configuration error: bad toml");
    }

    #[test]
    fn test_from_nlu_error() {
        let err: ChatError = NluError::Core(BandejaoError::UnknownIntent("MENU".to_string())).into();
        assert!(matches!(err, ChatError::Nlu(_)));
        assert!(err.to_string().contains("MENU"));
    }
}
