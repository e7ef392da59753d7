//! Dialog manager: turns a recognized intent into a response payload.
//!
//! Decides between a direct answer, a slot clarification and a fallback.
//! Owns no per-conversation state; everything it reads about the
//! conversation comes from the caller's [`DialogContext`].

use bandejao_core::config::{BandejaoConfig, DialogConfig};
use bandejao_core::error::BandejaoError;
use bandejao_core::{
    clamp_unit, DialogContext, Intent, McpResponse, ResponseMetadata, ResponseType,
};
use tracing::{debug, info};

use crate::selector::{selector_for, ResponseSelector};
use crate::templates::{default_suggestions, default_templates, render, slot_question, ResponseTemplate};

const LOW_CONFIDENCE_MESSAGE: &str = "Desculpe, não entendi sua pergunta. Posso ajudar com: \
horários de funcionamento, cardápio, preços, formas de pagamento, recarga do cartão, \
opções vegetarianas e veganas, alergias, localização e auxílio alimentação.";

const OUT_OF_SCOPE_MESSAGE: &str = "Sou o assistente do restaurante universitário e só consigo \
responder perguntas sobre o bandejão, como horários, cardápio, preços e serviços.";

const UNCERTAIN_MESSAGE: &str = "Não tenho certeza se entendi. Você quer saber sobre horários, \
cardápio ou preços do restaurante universitário?";

const LOW_CONFIDENCE_SUGGESTIONS: [&str; 3] = [
    "Qual o horário de funcionamento?",
    "Qual o cardápio de hoje?",
    "Quanto custa a refeição?",
];

const OUT_OF_SCOPE_SUGGESTIONS: [&str; 3] = [
    "Qual o cardápio de hoje?",
    "Onde fica o restaurante?",
    "Quais as formas de pagamento?",
];

const UNCERTAIN_SUGGESTIONS: [&str; 3] = [
    "Qual o horário de funcionamento?",
    "Quanto custa a refeição?",
    "Como recarregar o cartão?",
];

const CONFIRMATION_SUGGESTIONS: [&str; 2] = ["Sim", "Não"];

/// Generates [`McpResponse`]s from intents using a template table.
pub struct DialogManager {
    templates: Vec<ResponseTemplate>,
    selector: Box<dyn ResponseSelector>,
    config: DialogConfig,
}

impl Default for DialogManager {
    fn default() -> Self {
        Self::new(DialogConfig::default())
    }
}

impl DialogManager {
    /// Built-in templates; the selector is seeded when the config says so.
    pub fn new(config: DialogConfig) -> Self {
        let selector = selector_for(config.selector_seed);
        Self::with_selector(config, selector)
    }

    /// Built-in templates with an explicit selector.
    pub fn with_selector(config: DialogConfig, selector: Box<dyn ResponseSelector>) -> Self {
        Self {
            templates: default_templates(),
            selector,
            config,
        }
    }

    /// Built-in templates plus the `[[templates]]` entries of the config file.
    pub fn from_config(config: &BandejaoConfig) -> Result<Self, BandejaoError> {
        let mut manager = Self::new(config.dialog.clone());
        for entry in &config.templates {
            manager.add_response_template(ResponseTemplate::from_config(entry)?);
        }
        if !config.templates.is_empty() {
            info!(count = config.templates.len(), "Registered response templates from config");
        }
        Ok(manager)
    }

    // -----------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------

    /// Register a template, replacing any existing one for its intent.
    pub fn add_response_template(&mut self, template: ResponseTemplate) {
        match self.templates.iter().position(|t| t.intent == template.intent) {
            Some(pos) => self.templates[pos] = template,
            None => self.templates.push(template),
        }
    }

    /// Remove the template for `intent`. Returns `true` if one existed.
    pub fn remove_response_template(&mut self, intent: &Intent) -> bool {
        let before = self.templates.len();
        self.templates.retain(|t| &t.intent != intent);
        before != self.templates.len()
    }

    pub fn template(&self, intent: &Intent) -> Option<&ResponseTemplate> {
        self.templates.iter().find(|t| &t.intent == intent)
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    /// Confidence attached to clarification requests.
    pub fn clarification_confidence(&self) -> f32 {
        clamp_unit(self.config.clarification_confidence)
    }

    // -----------------------------------------------------------------
    // Responses
    // -----------------------------------------------------------------

    /// Build the response for a recognized intent.
    ///
    /// Never fails. Intents without a usable template, and the sentinel
    /// intents, get a fallback response.
    pub async fn generate_response(
        &self,
        intent: &Intent,
        context: &DialogContext,
        confidence: f32,
    ) -> McpResponse {
        let template = match self.template(intent) {
            Some(t) if !intent.is_sentinel() && !t.responses.is_empty() => t,
            _ => return self.fallback_response(intent, confidence),
        };

        let missing = template.missing_slots(context);
        if let Some(first) = missing.first() {
            debug!(intent = %intent, missing = ?missing, "Requesting slot clarification");
            return McpResponse {
                text: slot_question(first),
                response_type: ResponseType::Clarification,
                intent: Some(intent.clone()),
                confidence: self.clarification_confidence(),
                suggestions: None,
                requires_action: true,
                metadata: ResponseMetadata {
                    missing_slots: Some(missing),
                    ..ResponseMetadata::default()
                },
            };
        }

        let text = match template.responses.as_slice() {
            [only] => only.as_str(),
            candidates => {
                let idx = self.selector.select(candidates.len()).min(candidates.len() - 1);
                candidates[idx].as_str()
            }
        };

        let suggestions = template
            .follow_up_questions
            .clone()
            .unwrap_or_else(|| default_suggestions(intent));

        debug!(intent = %intent, confidence, "Direct answer");
        McpResponse {
            text: render(text, context),
            response_type: ResponseType::DirectAnswer,
            intent: Some(intent.clone()),
            confidence: clamp_unit(confidence),
            suggestions: Some(suggestions),
            requires_action: false,
            metadata: ResponseMetadata::default(),
        }
    }

    /// Ask the user to confirm something on behalf of `intent`.
    pub fn generate_confirmation_response(&self, message: &str, intent: &Intent) -> McpResponse {
        McpResponse {
            text: message.to_string(),
            response_type: ResponseType::Confirmation,
            intent: Some(intent.clone()),
            confidence: 1.0,
            suggestions: Some(to_strings(&CONFIRMATION_SUGGESTIONS)),
            requires_action: true,
            metadata: ResponseMetadata::default(),
        }
    }

    /// Three-tier fallback: low confidence, out of scope, uncertain.
    fn fallback_response(&self, intent: &Intent, confidence: f32) -> McpResponse {
        let (text, suggestions) = if confidence < self.config.low_confidence_threshold {
            (LOW_CONFIDENCE_MESSAGE, &LOW_CONFIDENCE_SUGGESTIONS)
        } else if *intent == Intent::OutOfScope {
            (OUT_OF_SCOPE_MESSAGE, &OUT_OF_SCOPE_SUGGESTIONS)
        } else {
            (UNCERTAIN_MESSAGE, &UNCERTAIN_SUGGESTIONS)
        };

        debug!(intent = %intent, confidence, "Fallback response");
        McpResponse {
            text: text.to_string(),
            response_type: ResponseType::Error,
            intent: Some(intent.clone()),
            confidence: clamp_unit(self.config.fallback_confidence),
            suggestions: Some(to_strings(suggestions)),
            requires_action: false,
            metadata: ResponseMetadata {
                fallback_used: true,
                ..ResponseMetadata::default()
            },
        }
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}
