//! End-to-end conversation tests: config file on disk, recognizer, dialog
//! manager and sessions wired together through the orchestrator.

use std::io::Write;

use bandejao_chat::ChatOrchestrator;
use bandejao_core::config::BandejaoConfig;
use bandejao_core::{DialogContext, Intent, ResponseType};

// =============================================================================
// Helpers
// =============================================================================

const CONFIG_TOML: &str = r#"
[general]
log_level = "debug"

[nlu]
min_confidence_threshold = 0.3

[dialog]
selector_seed = 42

[chat]
max_message_length = 500

[[intents]]
intent = "FESTA_JUNINA"
keywords = ["festa junina", "arraiá"]
patterns = ['\bquadrilha\b']
weight = 2.0

[[templates]]
intent = "FESTA_JUNINA"
responses = ["A festa junina do RU é no dia 24 de junho."]
follow_up_questions = ["Vai ter comida típica?"]

[[templates]]
intent = "MENU"
responses = ["O cardápio do {refeicao} está no aplicativo."]
requires_slots = ["refeicao"]
"#;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn orchestrator_from_file() -> ChatOrchestrator {
    let file = write_config(CONFIG_TOML);
    let config = BandejaoConfig::load(file.path()).unwrap();
    ChatOrchestrator::from_config(&config).unwrap()
}

// =============================================================================
// Config-driven behaviour
// =============================================================================

#[tokio::test]
async fn test_config_file_registers_custom_intent_and_template() {
    let orch = orchestrator_from_file();
    let mut ctx = DialogContext::new();

    let turn = orch
        .handle_turn("Quando é a festa junina?", &mut ctx)
        .await
        .unwrap();
    assert_eq!(turn.recognition.intent, Intent::custom("FESTA_JUNINA"));
    assert_eq!(turn.response.response_type, ResponseType::DirectAnswer);
    assert_eq!(turn.response.text, "A festa junina do RU é no dia 24 de junho.");
    assert_eq!(
        turn.response.suggestions,
        Some(vec!["Vai ter comida típica?".to_string()])
    );

    let turn = orch.handle_turn("vai ter quadrilha?", &mut ctx).await.unwrap();
    assert_eq!(turn.recognition.intent, Intent::custom("FESTA_JUNINA"));
}

#[tokio::test]
async fn test_config_template_replaces_builtin_and_gates_on_slot() {
    let orch = orchestrator_from_file();
    let mut ctx = DialogContext::new();

    let turn = orch.handle_turn("Qual é o cardápio?", &mut ctx).await.unwrap();
    assert_eq!(turn.recognition.intent, Intent::Menu);
    assert_eq!(turn.response.response_type, ResponseType::Clarification);
    assert!(turn.response.requires_action);
    assert_eq!(
        turn.response.metadata.missing_slots,
        Some(vec!["refeicao".to_string()])
    );

    let turn = orch.handle_turn("jantar", &mut ctx).await.unwrap();
    assert_eq!(turn.response.response_type, ResponseType::DirectAnswer);
    assert_eq!(turn.response.text, "O cardápio do jantar está no aplicativo.");
}

#[tokio::test]
async fn test_message_limit_from_config() {
    let orch = orchestrator_from_file();
    let mut ctx = DialogContext::new();
    let result = orch.handle_turn(&"a".repeat(501), &mut ctx).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_invalid_config_regex_is_rejected() {
    let file = write_config(
        r#"
[[intents]]
intent = "MENU"
patterns = ["(unclosed"]
"#,
    );
    let config = BandejaoConfig::load(file.path()).unwrap();
    assert!(ChatOrchestrator::from_config(&config).is_err());
}

// =============================================================================
// Conversations with default tables
// =============================================================================

#[tokio::test]
async fn test_multi_turn_session() {
    let orch = ChatOrchestrator::from_config(&BandejaoConfig::default()).unwrap();

    let (greeting, sid) = orch.handle_message("Bom dia!", None).await.unwrap();
    assert_eq!(greeting.recognition.intent, Intent::Greeting);
    assert_eq!(greeting.response.response_type, ResponseType::DirectAnswer);

    let (hours, _) = orch
        .handle_message("Qual o horário de funcionamento?", Some(sid))
        .await
        .unwrap();
    assert_eq!(hours.recognition.intent, Intent::Hours);
    assert!(hours.recognition.confidence >= 0.5);

    let (unknown, _) = orch.handle_message("xyz123 blah", Some(sid)).await.unwrap();
    assert_eq!(unknown.recognition.intent, Intent::Unknown);
    assert_eq!(unknown.response.response_type, ResponseType::Error);
    assert!(unknown.response.metadata.fallback_used);

    let (bye, _) = orch.handle_message("Tchau, obrigado", Some(sid)).await.unwrap();
    assert!(matches!(
        bye.recognition.intent,
        Intent::Goodbye | Intent::Thanks
    ));

    let ctx = orch.get_session(sid).await.unwrap();
    assert_eq!(ctx.turn_count, 4);
    assert_eq!(orch.session_count(), 1);
}

#[tokio::test]
async fn test_turn_json_wire_format() {
    let orch = ChatOrchestrator::from_config(&BandejaoConfig::default()).unwrap();
    let mut ctx = DialogContext::new();
    let turn = orch.handle_turn("Onde fica o RU?", &mut ctx).await.unwrap();
    let json = serde_json::to_value(&turn).unwrap();

    assert_eq!(json["recognition"]["intent"], "LOCATION");
    assert!(json["recognition"]["metadata"]["processingTimeMs"].is_number());
    assert_eq!(json["response"]["type"], "CLARIFICATION");
    assert_eq!(json["response"]["requiresAction"], true);
    assert_eq!(json["response"]["metadata"]["missingSlots"][0], "campus");
}
