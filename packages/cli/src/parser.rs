//! Structured-data parsing of the model's reply.
//!
//! Model and prompt are picked from the modality of the first content block;
//! the reply is parsed as JSON (with a fenced-code-block rescue) and the
//! date is normalized in code. The model is not trusted to reformat dates.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::config::DEFAULT_MAX_COMPLETION_TOKENS;
use crate::error::{CliError, Result};
use crate::llm::{CompletionClient, ContentPart, Message};
use crate::prompts::{SYSTEM_PROMPT, USER_TEXT_PROMPT, USER_VISION_PROMPT};
use crate::receipt::ContentBlock;

/// Parsed claim data, as extracted from one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub business_nif: String,

    #[serde(default)]
    pub personal_nif: Option<String>,

    pub invoice_number: String,

    #[serde(deserialize_with = "amount_from_number_or_string")]
    pub total_amount: f64,

    pub date: String,
}

/// The model occasionally quotes the amount; accept both shapes.
fn amount_from_number_or_string<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Model and user prompt for one extraction call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelChoice<'a> {
    pub model: &'a str,
    pub prompt: &'static str,
}

/// Pick model and prompt from the modality of the first content block.
///
/// Pure function; the cost/accuracy branch lives here and nowhere else.
#[must_use]
pub fn choose_model<'a>(
    blocks: &[ContentBlock],
    model_text: &'a str,
    model_vision: &'a str,
) -> ModelChoice<'a> {
    match blocks.first() {
        Some(ContentBlock::Text(_)) => ModelChoice {
            model: model_text,
            prompt: USER_TEXT_PROMPT,
        },
        _ => ModelChoice {
            model: model_vision,
            prompt: USER_VISION_PROMPT,
        },
    }
}

#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static CODE_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").expect("valid regex"));

/// Parse the model's reply into a normalized [`ReceiptRecord`].
///
/// Tries the reply as-is first, then the contents of a fenced code block.
/// There is no further retry; a reply that fails both is
/// [`CliError::MalformedModelOutput`].
pub fn parse_model_reply(reply: &str) -> Result<ReceiptRecord> {
    let mut record: ReceiptRecord = match serde_json::from_str(reply) {
        Ok(record) => record,
        Err(direct_err) => {
            let Some(captures) = CODE_FENCE.captures(reply) else {
                return Err(CliError::MalformedModelOutput(direct_err.to_string()));
            };
            serde_json::from_str(&captures[1])
                .map_err(|e| CliError::MalformedModelOutput(e.to_string()))?
        }
    };

    record.date = normalize_date(&record.date)?;
    Ok(record)
}

/// Normalize a date to `YYYY-MM-DD` from whatever group order the model
/// produced.
///
/// The value is split into digit groups. A 4-digit third group means
/// day-month-year and is reversed; a 4-digit first group is kept as
/// year-month-day. Anything else does not reveal where the year is and
/// fails rather than guessing.
pub fn normalize_date(raw: &str) -> Result<String> {
    let groups: Vec<&str> = raw
        .split(|c: char| !c.is_ascii_digit())
        .filter(|group| !group.is_empty())
        .collect();

    let &[first, second, third] = groups.as_slice() else {
        return Err(CliError::AmbiguousDate(raw.to_string()));
    };

    let (year, month, day) = if third.len() == 4 {
        (third, second, first)
    } else if first.len() == 4 {
        (first, second, third)
    } else {
        return Err(CliError::AmbiguousDate(raw.to_string()));
    };

    Ok(format!("{year}-{month:0>2}-{day:0>2}"))
}

/// Run the extraction call and parse the reply.
pub fn extract_record(
    llm: &CompletionClient,
    blocks: &[ContentBlock],
    model_text: &str,
    model_vision: &str,
) -> Result<ReceiptRecord> {
    let choice = choose_model(blocks, model_text, model_vision);
    tracing::info!(model = choice.model, "requesting structured extraction");

    let mut parts = vec![ContentPart::text(choice.prompt)];
    parts.extend(blocks.iter().map(ContentPart::from));
    let messages = [Message::system(SYSTEM_PROMPT), Message::user(parts)];

    let (reply, _usage) =
        llm.create_completion(choice.model, &messages, DEFAULT_MAX_COMPLETION_TOKENS)?;
    tracing::debug!(reply = %reply, "model reply");

    parse_model_reply(&reply)
}
