//! Core types shared by the recognizer and the dialog layer: the intent
//! taxonomy, recognition results, slots, dialog context and responses.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::BandejaoError;

// =============================================================================
// Intent taxonomy
// =============================================================================

/// Intents the assistant can recognize.
///
/// The built-in variants form the closed taxonomy of the cafeteria domain.
/// `Custom` exists only for intents registered at runtime by the host
/// application; it never appears unless a caller adds a pattern for it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Intent {
    Hours,
    Price,
    Location,
    Menu,
    VegetarianOption,
    VeganOption,
    Allergy,
    PaymentMethods,
    CardReload,
    FoodAssistance,
    SocialPrograms,
    QueueWait,
    HolidayHours,
    SanitaryProtocol,
    Contact,
    Greeting,
    Thanks,
    Goodbye,
    /// Sentinel: nothing matched with enough confidence.
    Unknown,
    /// Sentinel: the user asked about something outside the cafeteria domain.
    OutOfScope,
    Custom(String),
}

impl Intent {
    /// Every built-in intent, in the order the default tables register them.
    pub const BUILT_IN: [Intent; 20] = [
        Intent::Hours,
        Intent::Price,
        Intent::Location,
        Intent::Menu,
        Intent::VegetarianOption,
        Intent::VeganOption,
        Intent::Allergy,
        Intent::PaymentMethods,
        Intent::CardReload,
        Intent::FoodAssistance,
        Intent::SocialPrograms,
        Intent::QueueWait,
        Intent::HolidayHours,
        Intent::SanitaryProtocol,
        Intent::Contact,
        Intent::Greeting,
        Intent::Thanks,
        Intent::Goodbye,
        Intent::Unknown,
        Intent::OutOfScope,
    ];

    /// Build a runtime-registered intent.
    ///
    /// Names that spell a built-in (case-insensitive, `-` for `_`) resolve
    /// to that built-in, so one wire name never maps to two intents.
    pub fn custom(name: impl Into<String>) -> Self {
        let name = name.into();
        let canonical = name.trim().to_ascii_uppercase().replace('-', "_");
        Intent::BUILT_IN
            .into_iter()
            .find(|intent| intent.as_str() == canonical)
            .unwrap_or_else(|| Intent::Custom(name))
    }

    /// Canonical wire name (SCREAMING_SNAKE_CASE for built-ins).
    pub fn as_str(&self) -> &str {
        match self {
            Intent::Hours => "HOURS",
            Intent::Price => "PRICE",
            Intent::Location => "LOCATION",
            Intent::Menu => "MENU",
            Intent::VegetarianOption => "VEGETARIAN_OPTION",
            Intent::VeganOption => "VEGAN_OPTION",
            Intent::Allergy => "ALLERGY",
            Intent::PaymentMethods => "PAYMENT_METHODS",
            Intent::CardReload => "CARD_RELOAD",
            Intent::FoodAssistance => "FOOD_ASSISTANCE",
            Intent::SocialPrograms => "SOCIAL_PROGRAMS",
            Intent::QueueWait => "QUEUE_WAIT",
            Intent::HolidayHours => "HOLIDAY_HOURS",
            Intent::SanitaryProtocol => "SANITARY_PROTOCOL",
            Intent::Contact => "CONTACT",
            Intent::Greeting => "GREETING",
            Intent::Thanks => "THANKS",
            Intent::Goodbye => "GOODBYE",
            Intent::Unknown => "UNKNOWN",
            Intent::OutOfScope => "OUT_OF_SCOPE",
            Intent::Custom(name) => name,
        }
    }

    /// `true` for `Unknown` and `OutOfScope`.
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Intent::Unknown | Intent::OutOfScope)
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = BandejaoError;

    /// Parse an intent name. Built-in names match case-insensitively and
    /// accept `-` for `_`; any other non-empty name becomes `Custom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BandejaoError::UnknownIntent(s.to_string()));
        }
        Ok(Intent::custom(trimmed))
    }
}

impl Serialize for Intent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Intent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Recognition types
// =============================================================================

/// Clamp a score or confidence into [0, 1]. NaN collapses to 0.
pub fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Raw per-intent score for one utterance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntentScore {
    pub intent: Intent,
    pub score: f32,
}

/// A runner-up intent reported next to the winner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlternativeIntent {
    pub intent: Intent,
    pub confidence: f32,
}

/// Observability data attached to every recognition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionMetadata {
    /// Wall-clock time spent inside `recognize`.
    pub processing_time_ms: f64,
    /// Highest raw scores, descending.
    pub top_scores: Vec<IntentScore>,
}

/// Output of the intent recognizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentRecognitionResult {
    pub intent: Intent,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_intents: Option<Vec<AlternativeIntent>>,
    pub metadata: RecognitionMetadata,
}

/// Optional conversation hints passed to the recognizer.
///
/// Scoring does not read it yet; it is carried so context-aware scoring can
/// be added without changing the `recognize` signature.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub active_topics: Vec<String>,
}

impl From<&DialogContext> for RecognitionContext {
    fn from(ctx: &DialogContext) -> Self {
        Self {
            previous_intent: ctx.previous_intent.clone(),
            active_topics: Vec::new(),
        }
    }
}

// =============================================================================
// Dialog types
// =============================================================================

/// Expected shape of a slot value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotType {
    #[default]
    Text,
    Number,
    Date,
    Boolean,
    Choice,
}

/// A named piece of information collected during a conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(rename = "type", default)]
    pub slot_type: SlotType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub filled: bool,
}

impl Slot {
    /// An empty, required slot.
    pub fn new(name: impl Into<String>, slot_type: SlotType) -> Self {
        Self {
            name: name.into(),
            value: None,
            slot_type,
            required: true,
            filled: false,
        }
    }

    /// A slot that already holds a value.
    pub fn with_value(
        name: impl Into<String>,
        value: impl Into<String>,
        slot_type: SlotType,
    ) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            slot_type,
            required: true,
            filled: true,
        }
    }
}

/// A clarification the assistant is waiting on.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingClarification {
    pub intent: Intent,
    pub slot: String,
}

/// Per-conversation state, owned and persisted by the caller.
///
/// The dialog manager only reads it. Callers update it between turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogContext {
    pub conversation_id: Uuid,
    #[serde(default)]
    pub slots: HashMap<String, Slot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_intent: Option<Intent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending: Option<PendingClarification>,
    #[serde(default)]
    pub turn_count: u32,
    pub updated_at: Timestamp,
}

impl Default for DialogContext {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogContext {
    /// A fresh context with a random conversation id.
    pub fn new() -> Self {
        Self {
            conversation_id: Uuid::new_v4(),
            slots: HashMap::new(),
            previous_intent: None,
            pending: None,
            turn_count: 0,
            updated_at: Timestamp::now(),
        }
    }

    /// Builder-style slot insertion, mostly for tests and fixtures.
    pub fn with_slot(mut self, slot: Slot) -> Self {
        self.slots.insert(slot.name.clone(), slot);
        self
    }

    /// Store a value for `name`, creating a text slot if needed.
    pub fn fill_slot(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.slots.get_mut(name) {
            Some(slot) => {
                slot.value = Some(value);
                slot.filled = true;
            }
            None => {
                self.slots
                    .insert(name.to_string(), Slot::with_value(name, value, SlotType::Text));
            }
        }
    }

    /// A slot counts as filled only when present with `filled = true`.
    pub fn is_filled(&self, name: &str) -> bool {
        self.slots.get(name).is_some_and(|s| s.filled)
    }

    /// Value of a filled slot.
    pub fn slot_value(&self, name: &str) -> Option<&str> {
        self.slots
            .get(name)
            .filter(|s| s.filled)
            .and_then(|s| s.value.as_deref())
    }

    /// Names from `required` that are absent or unfilled, in order.
    pub fn missing_slots(&self, required: &[String]) -> Vec<String> {
        required
            .iter()
            .filter(|name| !self.is_filled(name))
            .cloned()
            .collect()
    }
}

/// Kind of response produced by the dialog manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    DirectAnswer,
    Clarification,
    Confirmation,
    Error,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseType::DirectAnswer => write!(f, "DIRECT_ANSWER"),
            ResponseType::Clarification => write!(f, "CLARIFICATION"),
            ResponseType::Confirmation => write!(f, "CONFIRMATION"),
            ResponseType::Error => write!(f, "ERROR"),
        }
    }
}

/// Bookkeeping attached to a response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_slots: Option<Vec<String>>,
    #[serde(default)]
    pub fallback_used: bool,
    #[serde(default)]
    pub llm_used: bool,
    pub generated_at: Timestamp,
}

impl Default for ResponseMetadata {
    fn default() -> Self {
        Self {
            missing_slots: None,
            fallback_used: false,
            llm_used: false,
            generated_at: Timestamp::now(),
        }
    }
}

/// Response payload handed back to the chat surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpResponse {
    pub text: String,
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Vec<String>>,
    #[serde(default)]
    pub requires_action: bool,
    pub metadata: ResponseMetadata,
}

// =============================================================================
// Newtype Wrappers
// =============================================================================

/// Unix timestamp in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp())
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.0, 0).unwrap_or_default()
    }

    /// Whole seconds elapsed since this timestamp.
    pub fn elapsed_secs(&self) -> i64 {
        Timestamp::now().0 - self.0
    }
}
