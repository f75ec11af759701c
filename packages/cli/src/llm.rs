//! Transport for the completion model.
//!
//! Speaks the OpenAI-style `/chat/completions` contract so the endpoint can
//! be pointed at any compatible server. No timeout is set here; the
//! operator aborts with the terminal if a call hangs.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};
use crate::receipt::ContentBlock;

/// User agent string identifying this client.
const USER_AGENT: &str = concat!("fhc-cli/", env!("CARGO_PKG_VERSION"));

/// One part of a multimodal user message.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

impl ContentPart {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }
}

impl From<&ContentBlock> for ContentPart {
    fn from(block: &ContentBlock) -> Self {
        match block {
            ContentBlock::Text(text) => ContentPart::Text { text: text.clone() },
            ContentBlock::Image { data_uri } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: data_uri.clone(),
                },
            },
        }
    }
}

/// System messages carry a plain string, user messages a list of parts.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: &'static str,
    pub content: MessageContent,
}

impl Message {
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Message {
            role: "system",
            content: MessageContent::Text(text.into()),
        }
    }

    #[must_use]
    pub fn user(parts: Vec<ContentPart>) -> Self {
        Message {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantReply,
}

#[derive(Debug, Deserialize)]
struct AssistantReply {
    content: Option<String>,
}

/// Token accounting reported by the endpoint.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

/// Blocking client for a chat-completions endpoint.
pub struct CompletionClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl CompletionClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError::Llm(e.to_string()))?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Run one completion request; returns the reply text and token usage.
    pub fn create_completion(
        &self,
        model: &str,
        messages: &[Message],
        max_tokens: u32,
    ) -> Result<(String, Usage)> {
        let url = format!("{}/chat/completions", self.api_url);
        let request = CompletionRequest {
            model,
            messages,
            max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| CliError::Llm(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(CliError::Llm(format!("endpoint returned {status}: {body}")));
        }

        let completion: CompletionResponse = response
            .json()
            .map_err(|e| CliError::Llm(format!("unparseable reply: {e}")))?;

        let usage = completion.usage.unwrap_or_default();
        tracing::debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            model,
            "completion finished"
        );

        let text = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CliError::Llm("reply carried no content".to_string()))?;

        Ok((text, usage))
    }
}
