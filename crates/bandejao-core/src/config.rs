//! Configuration management for the Bandejão assistant.
//!
//! Loads and saves the TOML file that tunes recognition, dialog and chat,
//! and carries extra intent patterns and response templates.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the assistant.
///
/// Loaded from a TOML file (see the `bandejao --config` flag). Every section
/// is optional; missing fields fall back to the defaults below, which are the
/// literal constants the scoring and dialog rules were tuned with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BandejaoConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub nlu: NluConfig,
    #[serde(default)]
    pub dialog: DialogConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    /// Extra or replacement intent patterns, registered after the built-ins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub intents: Vec<IntentPatternConfig>,
    /// Extra or replacement response templates, registered after the built-ins.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub templates: Vec<ResponseTemplateConfig>,
}

impl BandejaoConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BandejaoConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// Locale of the keyword/pattern/template tables.
    pub locale: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            locale: "pt-BR".to_string(),
        }
    }
}

/// Intent recognizer tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NluConfig {
    /// Below this top score the result is downgraded to `UNKNOWN`.
    pub min_confidence_threshold: f32,
    /// Dice similarity a token must exceed to count as a fuzzy keyword hit.
    pub similarity_threshold: f32,
    /// Alternatives must score at least this fraction of the top score.
    pub alternative_ratio: f32,
    /// Maximum number of alternatives reported.
    pub max_alternatives: usize,
    /// Number of raw scores kept in the result metadata.
    pub top_scores_limit: usize,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            min_confidence_threshold: 0.3,
            similarity_threshold: 0.7,
            alternative_ratio: 0.5,
            max_alternatives: 3,
            top_scores_limit: 5,
        }
    }
}

/// Dialog manager tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    /// Confidence reported on slot clarification requests.
    pub clarification_confidence: f32,
    /// Confidence reported on every fallback response.
    pub fallback_confidence: f32,
    /// Below this input confidence the "didn't understand" fallback is used.
    pub low_confidence_threshold: f32,
    /// Seed for deterministic response selection. Random when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector_seed: Option<u64>,
}

impl Default for DialogConfig {
    fn default() -> Self {
        Self {
            clarification_confidence: 0.8,
            fallback_confidence: 0.5,
            low_confidence_threshold: 0.3,
            selector_seed: None,
        }
    }
}

/// Chat orchestrator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the chat surface accepts messages at all.
    pub enabled: bool,
    /// Maximum message length in characters.
    pub max_message_length: usize,
    /// Idle minutes before a session is discarded.
    pub session_timeout_minutes: u32,
    /// Recognition confidence under which the LLM fallback is consulted.
    pub llm_fallback_threshold: f32,
    /// Upper bound on a single LLM fallback call.
    pub llm_timeout_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 2000,
            session_timeout_minutes: 30,
            llm_fallback_threshold: 0.3,
            llm_timeout_ms: 5000,
        }
    }
}

/// An intent pattern declared in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPatternConfig {
    /// Intent name; built-in names replace the default pattern.
    pub intent: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Regular expressions, matched case- and accent-insensitively.
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_keywords: Vec<String>,
}

/// A response template declared in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTemplateConfig {
    pub intent: String,
    pub responses: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub follow_up_questions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires_slots: Vec<String>,
}

fn default_weight() -> f32 {
    1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BandejaoError;
    use std::io::Write;

    fn create_temp_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_config_values() {
        let config = BandejaoConfig::default();

        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.locale, "pt-BR");

        assert!((config.nlu.min_confidence_threshold - 0.3).abs() < f32::EPSILON);
        assert!((config.nlu.similarity_threshold - 0.7).abs() < f32::EPSILON);
        assert!((config.nlu.alternative_ratio - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.nlu.max_alternatives, 3);
        assert_eq!(config.nlu.top_scores_limit, 5);

        assert!((config.dialog.clarification_confidence - 0.8).abs() < f32::EPSILON);
        assert!((config.dialog.fallback_confidence - 0.5).abs() < f32::EPSILON);
        assert!(config.dialog.selector_seed.is_none());

        assert!(config.chat.enabled);
        assert_eq!(config.chat.max_message_length, 2000);
        assert_eq!(config.chat.llm_timeout_ms, 5000);

        assert!(config.intents.is_empty());
        assert!(config.templates.is_empty());
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
[general]
log_level = "debug"

[nlu]
min_confidence_threshold = 0.45
max_alternatives = 2

[dialog]
selector_seed = 7

[chat]
enabled = false
llm_timeout_ms = 250

[[intents]]
intent = "FESTA_JUNINA"
keywords = ["festa junina", "quadrilha"]
patterns = ['\bpamonha\b']
weight = 2.0

[[templates]]
intent = "FESTA_JUNINA"
responses = ["A festa junina do RU é no dia 24 de junho."]
requires_slots = ["campus"]
"#;
        let file = create_temp_config(content);
        let config = BandejaoConfig::load(file.path()).unwrap();

        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.locale, "pt-BR");
        assert!((config.nlu.min_confidence_threshold - 0.45).abs() < f32::EPSILON);
        assert_eq!(config.nlu.max_alternatives, 2);
        assert_eq!(config.nlu.top_scores_limit, 5);
        assert_eq!(config.dialog.selector_seed, Some(7));
        assert!(!config.chat.enabled);
        assert_eq!(config.chat.llm_timeout_ms, 250);

        assert_eq!(config.intents.len(), 1);
        let intent = &config.intents[0];
        assert_eq!(intent.intent, "FESTA_JUNINA");
        assert_eq!(intent.keywords, vec!["festa junina", "quadrilha"]);
        assert_eq!(intent.patterns, vec![r"\bpamonha\b"]);
        assert!((intent.weight - 2.0).abs() < f32::EPSILON);

        assert_eq!(config.templates.len(), 1);
        assert_eq!(config.templates[0].requires_slots, vec!["campus"]);
        assert!(config.templates[0].follow_up_questions.is_empty());
    }

    #[test]
    fn test_intent_weight_defaults_to_one() {
        let content = r#"
[[intents]]
intent = "CONTACT"
keywords = ["ouvidoria"]
"#;
        let file = create_temp_config(content);
        let config = BandejaoConfig::load(file.path()).unwrap();
        assert!((config.intents[0].weight - 1.0).abs() < f32::EPSILON);
        assert!(config.intents[0].patterns.is_empty());
    }

    #[test]
    fn test_config_empty_toml_uses_all_defaults() {
        let file = create_temp_config("");
        let config = BandejaoConfig::load(file.path()).unwrap();
        assert_eq!(config.general.log_level, "info");
        assert!(config.chat.enabled);
    }

    #[test]
    fn test_config_load_invalid_toml() {
        let file = create_temp_config("this is {{ not valid TOML");
        let result = BandejaoConfig::load(file.path());
        assert!(matches!(result, Err(BandejaoError::Config(_))));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = BandejaoConfig::load_or_default(Path::new("/nonexistent/bandejao.toml"));
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("bandejao.toml");

        let mut config = BandejaoConfig::default();
        config.nlu.min_confidence_threshold = 0.4;
        config.templates.push(ResponseTemplateConfig {
            intent: "CONTACT".to_string(),
            responses: vec!["Fale com a ouvidoria.".to_string()],
            follow_up_questions: vec![],
            requires_slots: vec![],
        });
        config.save(&path).unwrap();

        assert!(path.exists());
        let reloaded = BandejaoConfig::load(&path).unwrap();
        assert!((reloaded.nlu.min_confidence_threshold - 0.4).abs() < f32::EPSILON);
        assert_eq!(reloaded.templates, config.templates);
    }
}
