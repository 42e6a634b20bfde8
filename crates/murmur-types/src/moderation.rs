//! Advisory content moderation: the evaluation prompt and the classification
//! of the model's reply.

use serde::{Deserialize, Serialize};

const APPROPRIATE: &str = "APPROPRIATE";
const INAPPROPRIATE: &str = "INAPPROPRIATE";

/// Outcome of a moderation check. `Unknown` covers transport failures and
/// replies that follow neither expected form; it must never be read as
/// either verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Appropriate,
    Inappropriate { reason: String },
    Unknown,
}

impl Verdict {
    /// Classify a raw model reply.
    pub fn classify(reply: &str) -> Self {
        let text = reply
            .trim()
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim_start();
        let upper = text.to_ascii_uppercase();

        if upper.starts_with(INAPPROPRIATE) {
            let reason = text[INAPPROPRIATE.len()..]
                .trim_start()
                .strip_prefix(':')
                .map(str::trim)
                .unwrap_or_default();
            return Verdict::Inappropriate {
                reason: reason.to_string(),
            };
        }
        if upper.starts_with(APPROPRIATE) {
            return Verdict::Appropriate;
        }
        Verdict::Unknown
    }

    /// Only an explicit `Inappropriate` blocks sending. `Unknown` means no
    /// verdict was reached and leaves the decision to the sender.
    pub fn allows_submit(&self) -> bool {
        !matches!(self, Verdict::Inappropriate { .. })
    }
}

/// Prompt sent to the model for a draft message.
pub fn evaluation_prompt(draft: &str) -> String {
    format!(
        r#"You are a content moderation assistant. Analyze the following message for appropriateness:

"{draft}"

Consider the following criteria:
1. Profanity or explicit language
2. Hate speech or discriminatory content
3. Personal attacks or bullying
4. Potentially harmful or dangerous content
5. Spam or irrelevant content

Respond EXACTLY with one of these options:
- "APPROPRIATE" if the message is acceptable.
- "INAPPROPRIATE: [specific reason]" if the message violates any of the above criteria.

Be thorough in your analysis and consistent in your judgments."#
    )
}

/// Default prompt for the message suggestion endpoint. The model is asked
/// for `||`-separated questions.
pub const SUGGESTION_PROMPT: &str = "Create a list of three open-ended and engaging questions formatted as a single string. Each question should be separated by '||'. These questions are for an anonymous social messaging platform, like Qooh.me, and should be suitable for a diverse audience. Avoid personal or sensitive topics, focusing instead on universal themes that encourage friendly interaction.";

/// Split a suggestion reply into individual questions.
pub fn split_suggestions(content: &str) -> Vec<String> {
    content
        .split("||")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
