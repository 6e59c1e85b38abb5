// ABOUTME: Core types for provider calls - the provider enum, messages,
// ABOUTME: requests and the normalized response shape.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Generation cap applied when a request does not set `max_tokens`.
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// A supported LLM provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAI,
    Anthropic,
    Gemini,
    OpenRouter,
}

impl Provider {
    /// Every supported provider.
    pub const ALL: [Provider; 4] = [
        Provider::OpenAI,
        Provider::Anthropic,
        Provider::Gemini,
        Provider::OpenRouter,
    ];

    /// Canonical lowercase identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
        }
    }

    /// Model used when neither the request nor the client config names one.
    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-5-haiku-latest",
            Provider::Gemini => "gemini-2.0-flash",
            Provider::OpenRouter => "anthropic/claude-3.5-sonnet",
        }
    }

    /// Prefix of this provider's environment variables (`OPENAI_API_KEY`, ...).
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI",
            Provider::Anthropic => "ANTHROPIC",
            Provider::Gemini => "GEMINI",
            Provider::OpenRouter => "OPENROUTER",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_ascii_lowercase();
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str() == id)
            .ok_or_else(|| {
                ClientError::configuration(format!(
                    "unsupported provider '{}' (expected one of: {})",
                    s.trim(),
                    Provider::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Request for a single completion.
#[derive(Debug, Clone)]
pub struct Request {
    pub provider: Provider,
    pub model: Option<String>,
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    /// Extra body fields, merged over the provider request as-is.
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Request {
    /// Create a request holding a single user prompt.
    pub fn new(provider: Provider, prompt: impl Into<String>) -> Self {
        Self {
            provider,
            model: None,
            messages: vec![Message::user(prompt)],
            system: None,
            max_tokens: None,
            temperature: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Create a request from a textual provider identifier.
    pub fn for_provider(provider: &str, prompt: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self::new(provider.parse()?, prompt))
    }

    /// Override the model for this request.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Append a message to the conversation.
    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Append several messages to the conversation.
    pub fn messages(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    /// Set the system prompt.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set a provider-specific body field.
    pub fn param(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    pub(crate) fn max_tokens_or_default(&self) -> u32 {
        self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS)
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    StopSequence,
    MaxTokens,
    ContentFilter,
    Other,
}

/// Outcome of a successful call, independent of provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Truncated,
    Filtered,
}

impl From<StopReason> for Status {
    fn from(reason: StopReason) -> Self {
        match reason {
            StopReason::MaxTokens => Status::Truncated,
            StopReason::ContentFilter => Status::Filtered,
            StopReason::EndTurn | StopReason::StopSequence | StopReason::Other => Status::Ok,
        }
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Normalized completion result.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    pub provider: Provider,
    pub id: String,
    pub model: String,
    pub text: String,
    pub status: Status,
    pub stop_reason: StopReason,
    pub usage: Usage,
    /// Raw provider body, passed through untouched.
    pub metadata: serde_json::Value,
}

impl Response {
    /// Whether the provider finished normally.
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }
}
