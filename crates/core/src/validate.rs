//! Schema validation and normalization for extracted provider JSON.
//!
//! [`validate_result`] turns an extracted JSON candidate into the
//! canonical [`AnalysisResult`]. The policy is deliberately lenient on
//! optional data and strict on invariants:
//!
//! - Unknown fields are ignored (forward-compatible).
//! - A missing or wrong-typed optional field gets a documented default;
//!   no single missing optional field ever aborts the job.
//! - Hard invariants abort with [`SchemaError`]: the reply must parse,
//!   `mainResults` must be present, headline scores must be in 0..=100,
//!   and emotion percentages must sum to 100 within a 0.1 tolerance.

use serde_json::{Map, Value};

use crate::result::{
    AnalysisResult, ConversationGuide, CustomAdvice, EmotionAnalysis, FavoriteMessage,
    InterestTrend, MainResults, PositiveSignal, Urgency,
};

/// Tolerance for the emotion-percentage sum invariant.
pub const EMOTION_SUM_TOLERANCE: f64 = 0.1;

/// Fallback emotion split used when the provider sent an emotion section
/// with missing or non-numeric components.
const DEFAULT_EMOTIONS: (f64, f64, f64) = (60.0, 25.0, 15.0);

/// Placeholder for missing required text fields.
const NO_RESULT: &str = "no result";

/// Default signal strength when a positive signal omits `confidence`.
const DEFAULT_SIGNAL_CONFIDENCE: i32 = 3;

/// Default confidence when the favorite message omits it.
const DEFAULT_MESSAGE_CONFIDENCE: f64 = 85.0;

/// A hard invariant was violated; the job fails with this error.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum SchemaError {
    /// The candidate is not parseable JSON.
    #[error("reply is not valid JSON: {0}")]
    Parse(String),

    /// The candidate parsed, but the top level is not an object.
    #[error("reply JSON is not an object")]
    NotAnObject,

    /// A required section is absent.
    #[error("required section missing: {0}")]
    MissingSection(&'static str),

    /// A numeric field is outside its allowed range.
    #[error("{field} out of range: {value} (expected {min} to {max})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Emotion percentages do not sum to 100 within tolerance.
    #[error("emotion percentages must sum to 100 (got {sum})")]
    EmotionSum { sum: f64 },
}

/// Validate and normalize an extracted JSON candidate.
pub fn validate_result(candidate: &str) -> Result<AnalysisResult, SchemaError> {
    let value: Value =
        serde_json::from_str(candidate).map_err(|e| SchemaError::Parse(e.to_string()))?;
    let root = value.as_object().ok_or(SchemaError::NotAnObject)?;

    let main_results = parse_main_results(root)?;
    let emotion_analysis = parse_emotion_analysis(root)?;

    Ok(AnalysisResult {
        main_results,
        emotion_analysis,
        interest_trends: parse_interest_trends(root),
        positive_signals: parse_positive_signals(root),
        favorite_message: parse_favorite_message(root),
        conversation_guides: parse_conversation_guides(root),
        custom_advice: parse_custom_advice(root),
    })
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `mainResults` is the one section that must be present.
fn parse_main_results(root: &Map<String, Value>) -> Result<MainResults, SchemaError> {
    let section = root
        .get("mainResults")
        .and_then(Value::as_object)
        .ok_or(SchemaError::MissingSection("mainResults"))?;

    let success_rate = num(section, "successRate").unwrap_or(0.0);
    // Providers frequently omit confidenceLevel; derive it from the
    // success rate in that case.
    let confidence_level = num(section, "confidenceLevel").unwrap_or(success_rate * 0.8);

    check_range("successRate", success_rate)?;
    check_range("confidenceLevel", confidence_level)?;

    Ok(MainResults {
        success_rate,
        confidence_level,
        relationship_stage: text(section, "relationshipStage").unwrap_or_else(|| NO_RESULT.into()),
        summary: text(section, "summary")
            .or_else(|| text(section, "heroInsight"))
            .unwrap_or_else(|| NO_RESULT.into()),
    })
}

/// Emotion data is optional as a whole; when the section exists, missing
/// components fall back to the default split rather than failing, and
/// the sum invariant is enforced on whatever values end up being used.
fn parse_emotion_analysis(
    root: &Map<String, Value>,
) -> Result<Option<EmotionAnalysis>, SchemaError> {
    let Some(section) = root.get("emotionAnalysis").and_then(Value::as_object) else {
        return Ok(None);
    };

    let (positive, neutral, negative) = match (
        num(section, "positive"),
        num(section, "neutral"),
        num(section, "negative"),
    ) {
        (Some(p), Some(n), Some(neg)) => (p, n, neg),
        _ => DEFAULT_EMOTIONS,
    };

    let sum = positive + neutral + negative;
    if (sum - 100.0).abs() > EMOTION_SUM_TOLERANCE {
        return Err(SchemaError::EmotionSum { sum });
    }

    Ok(Some(EmotionAnalysis {
        positive,
        neutral,
        negative,
        dominant_emotion: text(section, "dominantEmotion"),
        positive_keywords: string_list(section, "positiveKeywords"),
        negative_keywords: string_list(section, "negativeKeywords"),
    }))
}

fn parse_interest_trends(root: &Map<String, Value>) -> Vec<InterestTrend> {
    objects(root, "interestTrends")
        .map(|entry| InterestTrend {
            date: text(entry, "date").unwrap_or_default(),
            value: num(entry, "value").unwrap_or(0.0),
            message_count: int(entry, "messageCount").unwrap_or(0),
            avg_response_time: num(entry, "avgResponseTime").unwrap_or(0.0),
            emoji_count: int(entry, "emojiCount").unwrap_or(0),
        })
        .collect()
}

fn parse_positive_signals(root: &Map<String, Value>) -> Vec<PositiveSignal> {
    objects(root, "positiveSignals")
        .map(|entry| PositiveSignal {
            text: text(entry, "text").unwrap_or_else(|| NO_RESULT.into()),
            description: text(entry, "description").unwrap_or_default(),
            confidence: int(entry, "confidence").unwrap_or(DEFAULT_SIGNAL_CONFIDENCE),
            signal_type: text(entry, "type").unwrap_or_else(|| "positive_indicator".into()),
        })
        .collect()
}

fn parse_favorite_message(root: &Map<String, Value>) -> Option<FavoriteMessage> {
    let section = root.get("favoriteMessage").and_then(Value::as_object)?;
    Some(FavoriteMessage {
        text: text(section, "text").unwrap_or_else(|| NO_RESULT.into()),
        confidence: num(section, "confidence").unwrap_or(DEFAULT_MESSAGE_CONFIDENCE),
        date: text(section, "date").unwrap_or_default(),
        reason: text(section, "reason").unwrap_or_default(),
        sender: text(section, "sender").unwrap_or_else(|| "partner".into()),
    })
}

fn parse_conversation_guides(root: &Map<String, Value>) -> Vec<ConversationGuide> {
    objects(root, "conversationGuides")
        .map(|entry| ConversationGuide {
            guide_type: text(entry, "type").unwrap_or_default(),
            text: text(entry, "text").unwrap_or_else(|| NO_RESULT.into()),
            timing: text(entry, "timing").unwrap_or_default(),
            context: text(entry, "context").unwrap_or_default(),
        })
        .collect()
}

fn parse_custom_advice(root: &Map<String, Value>) -> Vec<CustomAdvice> {
    objects(root, "customAdvice")
        .enumerate()
        .map(|(index, entry)| CustomAdvice {
            title: text(entry, "title").unwrap_or_else(|| NO_RESULT.into()),
            content: text(entry, "content").unwrap_or_else(|| NO_RESULT.into()),
            // Entry order encodes priority; a provider-sent value wins.
            priority: int(entry, "priority").unwrap_or(index as i32 + 1),
            urgency: text(entry, "urgency")
                .map(|raw| Urgency::normalize(&raw))
                .unwrap_or_default(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

fn check_range(field: &'static str, value: f64) -> Result<(), SchemaError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(SchemaError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

/// Numeric field, tolerating numbers encoded as strings.
fn num(map: &Map<String, Value>, key: &str) -> Option<f64> {
    match map.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Integer field, tolerating floats and numbers encoded as strings.
fn int<T: TryFrom<i64>>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let n = num(map, key)?;
    T::try_from(n as i64).ok()
}

fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    map.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default()
}

/// Iterate the object entries of an array field, skipping non-objects.
fn objects<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> impl Iterator<Item = &'a Map<String, Value>> {
    root.get(key)
        .and_then(Value::as_array)
        .map(|items| items.as_slice())
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_object)
}
