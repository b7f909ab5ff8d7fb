//! Analysis prompt construction.
//!
//! [`build_analysis_prompt`] is a pure function: the same conversation
//! text always produces the same prompt, byte for byte. The template
//! names the exact JSON field set the validator expects back and
//! forbids any non-JSON content in the reply, which keeps the
//! downstream extraction step as simple as possible.

/// Maximum number of characters of conversation text embedded in a
/// prompt. Longer conversations are truncated so provider token limits
/// are respected deterministically instead of failing mid-call.
pub const MAX_INPUT_CHARS: usize = 12_000;

const TRUNCATION_MARKER: &str = "\n...[conversation truncated for analysis]";

/// The fixed instruction template. `{}`-style placeholders are not used;
/// the conversation is appended by [`build_analysis_prompt`] so the
/// template itself stays a single comparable constant.
const INSTRUCTION_HEADER: &str = "\
You are a relationship analyst. Analyze the conversation below and reply \
with **JSON only** -- no prose, no explanation, no markdown outside the \
JSON object.

Reply with exactly this structure (types in parentheses, do not include \
the parentheses in your reply):

{
  \"mainResults\": {
    \"successRate\": (number 0-100),
    \"confidenceLevel\": (number 0-100),
    \"relationshipStage\": (string),
    \"summary\": (string)
  },
  \"emotionAnalysis\": {
    \"positive\": (number 0-100),
    \"neutral\": (number 0-100),
    \"negative\": (number 0-100),
    \"dominantEmotion\": (string),
    \"positiveKeywords\": [(string)],
    \"negativeKeywords\": [(string)]
  },
  \"interestTrends\": [
    { \"date\": (string), \"value\": (number 0-100), \"messageCount\": (integer), \"avgResponseTime\": (number, minutes), \"emojiCount\": (integer) }
  ],
  \"positiveSignals\": [
    { \"text\": (string), \"description\": (string), \"confidence\": (integer), \"type\": (string) }
  ],
  \"favoriteMessage\": { \"text\": (string), \"confidence\": (number 0-100), \"date\": (string), \"reason\": (string), \"sender\": (string) },
  \"conversationGuides\": [
    { \"type\": (string), \"text\": (string), \"timing\": (string), \"context\": (string) }
  ],
  \"customAdvice\": [
    { \"title\": (string), \"content\": (string), \"priority\": (integer), \"urgency\": (\"low\" | \"medium\" | \"high\") }
  ]
}

The three emotionAnalysis percentages must sum to 100. interestTrends must \
be in chronological order. positiveSignals and customAdvice must be ordered \
by importance, most important first.";

const INSTRUCTION_FOOTER: &str = "\
Important: reply with the JSON object only. Any text outside the JSON \
object will be discarded.";

/// Build the provider-facing analysis prompt for one conversation.
///
/// Deterministic and side-effect free; safe to call repeatedly and
/// compare outputs byte-for-byte. Conversations longer than
/// [`MAX_INPUT_CHARS`] characters are cut at a character boundary and
/// marked as truncated.
pub fn build_analysis_prompt(raw_input: &str) -> String {
    let mut prompt = String::with_capacity(
        INSTRUCTION_HEADER.len() + raw_input.len().min(MAX_INPUT_CHARS) + 128,
    );
    prompt.push_str(INSTRUCTION_HEADER);
    prompt.push_str("\n\nConversation:\n");
    push_capped(&mut prompt, raw_input);
    prompt.push_str("\n\n");
    prompt.push_str(INSTRUCTION_FOOTER);
    prompt
}

/// Append `input` to `out`, cutting at [`MAX_INPUT_CHARS`] characters
/// (not bytes, so multi-byte text is never split mid-character).
fn push_capped(out: &mut String, input: &str) {
    if input.chars().count() <= MAX_INPUT_CHARS {
        out.push_str(input);
        return;
    }
    out.extend(input.chars().take(MAX_INPUT_CHARS));
    out.push_str(TRUNCATION_MARKER);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let a = build_analysis_prompt("hello\nhow are you");
        let b = build_analysis_prompt("hello\nhow are you");
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_embeds_conversation_verbatim() {
        let prompt = build_analysis_prompt("A: coffee tomorrow?\nB: sure!");
        assert!(prompt.contains("A: coffee tomorrow?\nB: sure!"));
    }

    #[test]
    fn prompt_demands_json_only() {
        let prompt = build_analysis_prompt("hi");
        assert!(prompt.contains("JSON only"));
        assert!(prompt.contains("\"mainResults\""));
        assert!(prompt.contains("\"customAdvice\""));
    }

    #[test]
    fn long_input_is_truncated_with_marker() {
        let input = format!("{}OVERFLOW-SENTINEL", "가".repeat(MAX_INPUT_CHARS));
        let prompt = build_analysis_prompt(&input);
        assert!(prompt.contains(TRUNCATION_MARKER.trim_start()));
        // Everything past the cap is gone.
        assert!(!prompt.contains("OVERFLOW-SENTINEL"));
    }

    #[test]
    fn short_input_is_not_truncated() {
        let prompt = build_analysis_prompt("short conversation");
        assert!(!prompt.contains("[conversation truncated"));
    }
}
