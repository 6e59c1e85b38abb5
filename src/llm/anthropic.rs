// ABOUTME: Anthropic Messages API client implementation.
// ABOUTME: Implements LlmClient for Claude models.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use super::client::{Endpoint, LlmClient};
use super::{http, Message, Provider, Request, Response, Role, Status, StopReason, Usage};
use crate::config::ProviderConfig;
use crate::error::ClientError;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com/v1";
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic API request format.
#[derive(Debug, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub messages: Vec<AnthropicMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Anthropic message format.
#[derive(Debug, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

/// Anthropic content block. Only text is read back.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
pub struct AnthropicResponse {
    pub id: String,
    pub content: Vec<AnthropicContent>,
    pub stop_reason: Option<String>,
    pub model: String,
    pub usage: AnthropicUsage,
}

/// Anthropic usage stats.
#[derive(Debug, Deserialize)]
pub struct AnthropicUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<&Message> for AnthropicMessage {
    fn from(msg: &Message) -> Self {
        AnthropicMessage {
            role: match msg.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: msg.content.clone(),
        }
    }
}

impl AnthropicRequest {
    pub fn build(req: &Request, model: &str) -> Self {
        AnthropicRequest {
            model: model.to_string(),
            messages: req.messages.iter().map(AnthropicMessage::from).collect(),
            max_tokens: req.max_tokens_or_default(),
            system: req.system.clone(),
            temperature: req.temperature,
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("end_turn") => StopReason::EndTurn,
        Some("stop_sequence") => StopReason::StopSequence,
        Some("max_tokens") => StopReason::MaxTokens,
        Some("refusal") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

impl AnthropicResponse {
    pub fn into_response(self, metadata: serde_json::Value) -> Response {
        let text = self
            .content
            .iter()
            .filter_map(|c| match c {
                AnthropicContent::Text { text } => Some(text.as_str()),
                AnthropicContent::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");
        let stop_reason = parse_stop_reason(self.stop_reason.as_deref());

        Response {
            provider: Provider::Anthropic,
            id: self.id,
            model: self.model,
            text,
            status: Status::from(stop_reason),
            stop_reason,
            usage: Usage {
                input_tokens: self.usage.input_tokens,
                output_tokens: self.usage.output_tokens,
            },
            metadata,
        }
    }
}

/// Client for the Anthropic API.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    endpoint: Endpoint,
    http: reqwest::Client,
}

fn version_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("anthropic-version", HeaderValue::from_static(ANTHROPIC_VERSION));
    headers
}

impl AnthropicClient {
    /// Create a client from provider settings.
    pub fn from_config(config: &ProviderConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Endpoint::from_config(Provider::Anthropic, config, ANTHROPIC_BASE_URL)?,
            http: http::build_http(timeout, version_headers())?,
        })
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn complete(&self, req: &Request) -> Result<Response, ClientError> {
        let model = self.endpoint.model_for(req);
        let body = http::encode_body(&AnthropicRequest::build(req, model), &req.extra)?;
        let url = http::endpoint(&self.endpoint.base_url, "messages");

        tracing::debug!(provider = %Provider::Anthropic, model, url = %url, "sending message");

        let raw = http::send(
            Provider::Anthropic,
            self.http
                .post(&url)
                .header("x-api-key", self.endpoint.api_key.expose())
                .json(&body),
        )
        .await?;

        let resp: AnthropicResponse = http::decode(Provider::Anthropic, &raw)?;
        Ok(resp.into_response(raw))
    }
}
