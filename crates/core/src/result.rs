//! Canonical analysis result model.
//!
//! This is the single typed shape shared by the validator, the result
//! sink, and the HTTP read path. Field names serialize in camelCase --
//! that spelling is the contract the sink stores and the frontend
//! consumes, so renames here are breaking changes.

use serde::{Deserialize, Serialize};

/// Validated output of one completed analysis job.
///
/// Produced exclusively by [`crate::validate::validate_result`]; once
/// attached to a job it is read-only and shared by concurrent pollers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Headline scores and relationship summary.
    pub main_results: MainResults,
    /// Emotion breakdown; `None` when the provider returned no emotion data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion_analysis: Option<EmotionAnalysis>,
    /// Interest-over-time series, chronological. Order is caller-significant.
    #[serde(default)]
    pub interest_trends: Vec<InterestTrend>,
    /// Positive signals, ordered by priority (first = strongest).
    #[serde(default)]
    pub positive_signals: Vec<PositiveSignal>,
    /// Single most affectionate message, when one was identified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorite_message: Option<FavoriteMessage>,
    /// Suggested conversation openers.
    #[serde(default)]
    pub conversation_guides: Vec<ConversationGuide>,
    /// Tailored advice entries, ordered by priority.
    #[serde(default)]
    pub custom_advice: Vec<CustomAdvice>,
}

/// Headline analysis scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainResults {
    /// Estimated chance the relationship progresses, 0-100.
    pub success_rate: f64,
    /// Model confidence in `success_rate`, 0-100.
    pub confidence_level: f64,
    /// Free-text stage label (e.g. "early interest").
    pub relationship_stage: String,
    /// One-paragraph insight for the headline card.
    pub summary: String,
}

/// Emotion distribution across the conversation.
///
/// `positive + neutral + negative` sums to 100 (validated to a 0.1
/// tolerance before this struct is ever constructed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionAnalysis {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    /// Label of the strongest emotion, when the provider named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant_emotion: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positive_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_keywords: Vec<String>,
}

/// One point in the interest-over-time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestTrend {
    /// Display date label for the data point.
    pub date: String,
    /// Interest score for that day, 0-100.
    pub value: f64,
    pub message_count: u32,
    /// Average reply latency in minutes.
    pub avg_response_time: f64,
    pub emoji_count: u32,
}

/// A positive indicator extracted from the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositiveSignal {
    pub text: String,
    pub description: String,
    /// Signal strength on a small integer scale.
    pub confidence: i32,
    #[serde(rename = "type")]
    pub signal_type: String,
}

/// The single most affectionate message found in the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteMessage {
    pub text: String,
    pub confidence: f64,
    pub date: String,
    pub reason: String,
    pub sender: String,
}

/// A suggested conversation opener with timing advice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationGuide {
    #[serde(rename = "type")]
    pub guide_type: String,
    pub text: String,
    pub timing: String,
    pub context: String,
}

/// A tailored advice entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAdvice {
    pub title: String,
    pub content: String,
    /// Display order, 1-based. Lower is more important.
    pub priority: i32,
    pub urgency: Urgency,
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Closed urgency tier for advice entries.
///
/// Providers return urgency as free text in several spellings (and
/// languages); [`Urgency::normalize`] is the single mapping from that
/// free text onto this enum. Serializes as lowercase strings
/// (`"low"` / `"medium"` / `"high"`) -- the encoding the sink accepts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    #[default]
    Medium,
    High,
}

impl Urgency {
    /// Map a free-text urgency label onto a tier.
    ///
    /// Matching is case-insensitive and tolerant of the synonyms seen in
    /// provider output, including Korean labels. Unrecognized input maps
    /// to `Medium`; this function never fails.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "low" | "l" | "minor" | "낮음" => Self::Low,
            "medium" | "m" | "mid" | "normal" | "중간" | "보통" => Self::Medium,
            "high" | "h" | "urgent" | "critical" | "긴급" | "높음" => Self::High,
            _ => Self::Medium,
        }
    }
}
