//! Multi-signal intent scoring and ranking.
//!
//! Every registered pattern scores the utterance independently (regex,
//! keyword and fuzzy keyword signals plus a multi-match bonus); the ranked
//! scores are then calibrated into a single [`IntentRecognitionResult`].

use std::time::Instant;

use bandejao_core::config::{BandejaoConfig, NluConfig};
use bandejao_core::{
    clamp_unit, AlternativeIntent, Intent, IntentRecognitionResult, IntentScore,
    RecognitionContext, RecognitionMetadata,
};
use tracing::{debug, info, trace};

use crate::error::NluError;
use crate::normalize::{normalize, tokenize};
use crate::patterns::{default_patterns, IntentPattern};
use crate::similarity::dice_coefficient;

const REGEX_SIGNAL: f32 = 0.4;
const KEYWORD_SIGNAL: f32 = 0.3;
const SIMILARITY_SIGNAL: f32 = 0.2;
const MULTI_MATCH_BONUS: f32 = 0.1;
const MAX_BONUS_MATCHES: usize = 3;
/// Keywords whose length differs from a token by more than this are skipped.
const MAX_LENGTH_DELTA: usize = 3;
/// Confidence multiplier applied when the top score is below the threshold.
const LOW_CONFIDENCE_FACTOR: f32 = 0.5;

/// Stateless intent recognizer over a table of [`IntentPattern`]s.
///
/// Holds at most one pattern per intent. Registration takes `&mut self`;
/// recognition takes `&self` and can run concurrently.
#[derive(Debug, Clone)]
pub struct IntentRecognizer {
    patterns: Vec<IntentPattern>,
    config: NluConfig,
}

impl Default for IntentRecognizer {
    fn default() -> Self {
        Self::new(NluConfig::default())
    }
}

impl IntentRecognizer {
    /// Create a recognizer with the built-in pattern table.
    pub fn new(config: NluConfig) -> Self {
        Self::with_patterns(config, default_patterns())
    }

    /// Create a recognizer over an explicit pattern table.
    ///
    /// Later patterns replace earlier ones for the same intent.
    pub fn with_patterns(mut config: NluConfig, patterns: Vec<IntentPattern>) -> Self {
        config.min_confidence_threshold = clamp_unit(config.min_confidence_threshold);
        let mut recognizer = Self {
            patterns: Vec::with_capacity(patterns.len()),
            config,
        };
        for pattern in patterns {
            recognizer.add_intent_pattern(pattern);
        }
        recognizer
    }

    /// Built-in table plus the `[[intents]]` entries of the config file.
    pub fn from_config(config: &BandejaoConfig) -> Result<Self, NluError> {
        let mut recognizer = Self::new(config.nlu.clone());
        for entry in &config.intents {
            recognizer.add_intent_pattern(IntentPattern::from_config(entry)?);
        }
        if !config.intents.is_empty() {
            info!(count = config.intents.len(), "Registered intent patterns from config");
        }
        Ok(recognizer)
    }

    // -----------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------

    /// Register a pattern, replacing any existing pattern for its intent.
    pub fn add_intent_pattern(&mut self, pattern: IntentPattern) {
        match self.patterns.iter().position(|p| p.intent == pattern.intent) {
            Some(pos) => {
                debug!(intent = %pattern.intent, "Replacing intent pattern");
                self.patterns[pos] = pattern;
            }
            None => {
                debug!(intent = %pattern.intent, "Adding intent pattern");
                self.patterns.push(pattern);
            }
        }
    }

    /// Remove the pattern for `intent`. Returns `true` if one existed.
    pub fn remove_intent_pattern(&mut self, intent: &Intent) -> bool {
        let before = self.patterns.len();
        self.patterns.retain(|p| &p.intent != intent);
        before != self.patterns.len()
    }

    /// Set the minimum top score, clamped to [0, 1].
    pub fn set_min_confidence_threshold(&mut self, threshold: f32) {
        self.config.min_confidence_threshold = clamp_unit(threshold);
    }

    pub fn min_confidence_threshold(&self) -> f32 {
        self.config.min_confidence_threshold
    }

    /// Pattern registered for `intent`, if any.
    pub fn pattern(&self, intent: &Intent) -> Option<&IntentPattern> {
        self.patterns.iter().find(|p| &p.intent == intent)
    }

    /// Number of registered patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    // -----------------------------------------------------------------
    // Recognition
    // -----------------------------------------------------------------

    /// Classify an utterance.
    ///
    /// Never fails: empty, punctuation-only or non-Latin input simply scores
    /// zero everywhere and yields `Unknown`. `context` is accepted for
    /// forward compatibility and does not affect scoring.
    pub fn recognize(
        &self,
        utterance: &str,
        context: Option<&RecognitionContext>,
    ) -> IntentRecognitionResult {
        let started = Instant::now();

        if let Some(ctx) = context {
            trace!(previous_intent = ?ctx.previous_intent, "Recognition context supplied");
        }

        let ranked = self.rank(utterance);
        let threshold = self.config.min_confidence_threshold;

        // rank() always includes the sentinels, so there is a first entry.
        let (top_intent, top_score) = ranked
            .first()
            .map(|s| (s.intent.clone(), s.score))
            .unwrap_or((Intent::Unknown, 0.0));

        let (intent, confidence) = if top_score < threshold || top_score <= 0.0 {
            trace!(
                top_intent = %top_intent,
                top_score,
                threshold,
                "Top score below threshold, downgrading to UNKNOWN"
            );
            (Intent::Unknown, clamp_unit(top_score * LOW_CONFIDENCE_FACTOR))
        } else {
            (top_intent, top_score)
        };

        let min_alternative = top_score * self.config.alternative_ratio;
        let alternatives: Vec<AlternativeIntent> = ranked
            .iter()
            .skip(1)
            .filter(|s| s.intent != intent)
            .filter(|s| s.score > 0.0 && s.score >= min_alternative && s.score >= threshold)
            .take(self.config.max_alternatives)
            .map(|s| AlternativeIntent {
                intent: s.intent.clone(),
                confidence: s.score,
            })
            .collect();

        let top_scores: Vec<IntentScore> = ranked
            .into_iter()
            .take(self.config.top_scores_limit)
            .collect();

        let processing_time_ms = started.elapsed().as_secs_f64() * 1000.0;
        debug!(
            intent = %intent,
            confidence,
            alternatives = alternatives.len(),
            processing_time_ms,
            "Utterance recognized"
        );

        IntentRecognitionResult {
            intent,
            confidence,
            alternative_intents: if alternatives.is_empty() {
                None
            } else {
                Some(alternatives)
            },
            metadata: RecognitionMetadata {
                processing_time_ms,
                top_scores,
            },
        }
    }

    /// Score every registered intent and sort descending.
    ///
    /// `Unknown` and `OutOfScope` are always present. Ties keep registration
    /// order, so the ranking is deterministic.
    pub fn rank(&self, utterance: &str) -> Vec<IntentScore> {
        let normalized = normalize(utterance);
        let tokens = tokenize(&normalized);

        let mut scores: Vec<IntentScore> = self
            .patterns
            .iter()
            .map(|p| IntentScore {
                intent: p.intent.clone(),
                score: self.score_pattern(p, &normalized, &tokens),
            })
            .collect();

        for sentinel in [Intent::Unknown, Intent::OutOfScope] {
            if !scores.iter().any(|s| s.intent == sentinel) {
                scores.push(IntentScore {
                    intent: sentinel,
                    score: 0.0,
                });
            }
        }

        scores.sort_by(|a, b| b.score.total_cmp(&a.score));
        scores
    }

    fn score_pattern(&self, pattern: &IntentPattern, normalized: &str, tokens: &[&str]) -> f32 {
        let weight = pattern.weight;
        let mut score = 0.0f32;
        let mut matches = 0usize;

        for regex in pattern.regexes() {
            if regex.is_match(normalized) {
                score += REGEX_SIGNAL * weight;
                matches += 1;
            }
        }

        for keyword in pattern.keywords() {
            if normalized.contains(keyword.as_str()) {
                score += KEYWORD_SIGNAL * weight;
                matches += 1;
            }
        }

        let similarity = best_similarity(tokens, pattern.keywords());
        if similarity > self.config.similarity_threshold {
            score += SIMILARITY_SIGNAL * similarity * weight;
            matches += 1;
        }

        if matches > 1 {
            score += MULTI_MATCH_BONUS * (matches - 1).min(MAX_BONUS_MATCHES) as f32;
        }

        clamp_unit(score)
    }
}

/// Highest Dice similarity between any token and any keyword of similar length.
fn best_similarity(tokens: &[&str], keywords: &[String]) -> f32 {
    let mut best = 0.0f32;
    for token in tokens {
        let token_len = token.chars().count();
        for keyword in keywords {
            if token_len.abs_diff(keyword.chars().count()) > MAX_LENGTH_DELTA {
                continue;
            }
            best = best.max(dice_coefficient(token, keyword));
        }
    }
    best
}
