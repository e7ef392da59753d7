//! Dialog layer for the Bandejão assistant.
//!
//! Provides response templates, the dialog manager that turns recognized
//! intents into response payloads, and the chat orchestrator that runs
//! whole turns over in-memory sessions.

pub mod error;
pub mod orchestrator;
pub mod response;
pub mod selector;
pub mod templates;

pub use error::ChatError;
pub use orchestrator::{ChatOrchestrator, ChatTurn, LlmFallback};
pub use response::DialogManager;
pub use selector::{RandomSelector, ResponseSelector, SeededSelector};
pub use templates::{default_templates, ResponseTemplate};
