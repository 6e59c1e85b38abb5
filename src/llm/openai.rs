// ABOUTME: OpenAI chat completions client implementation.
// ABOUTME: Implements LlmClient for GPT models; the wire types are shared with OpenRouter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::client::{Endpoint, LlmClient};
use super::{http, Message, Provider, Request, Response, Role, Status, StopReason, Usage};
use crate::config::ProviderConfig;
use crate::error::ClientError;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI API request format.
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    pub model: String,
    pub messages: Vec<OpenAIMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// OpenAI message format.
#[derive(Debug, Serialize, Deserialize)]
pub struct OpenAIMessage {
    pub role: String,
    pub content: String,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<OpenAIChoice>,
    pub usage: Option<OpenAIUsage>,
}

/// OpenAI response choice.
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIResponseMessage,
    pub finish_reason: Option<String>,
}

/// OpenAI response message.
#[derive(Debug, Deserialize)]
pub struct OpenAIResponseMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub refusal: Option<String>,
}

/// OpenAI usage stats.
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl From<&Message> for OpenAIMessage {
    fn from(msg: &Message) -> Self {
        OpenAIMessage {
            role: match msg.role {
                Role::User => "user".to_string(),
                Role::Assistant => "assistant".to_string(),
            },
            content: msg.content.clone(),
        }
    }
}

impl OpenAIRequest {
    pub fn build(req: &Request, model: &str) -> Self {
        let mut messages = Vec::with_capacity(req.messages.len() + 1);

        if let Some(ref system) = req.system {
            messages.push(OpenAIMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.extend(req.messages.iter().map(OpenAIMessage::from));

        OpenAIRequest {
            model: model.to_string(),
            messages,
            max_tokens: req.max_tokens_or_default(),
            temperature: req.temperature,
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("stop") => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

impl OpenAIResponse {
    /// Normalize, keeping the raw body as metadata.
    pub fn into_response(
        self,
        provider: Provider,
        metadata: serde_json::Value,
    ) -> Result<Response, ClientError> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Err(ClientError::Provider {
                status: 200,
                message: format!("{provider} response contained no choices"),
                metadata: serde_json::json!({ "status": 200, "body": metadata }),
            });
        };

        let mut stop_reason = parse_stop_reason(choice.finish_reason.as_deref());
        if choice.message.refusal.is_some() && choice.message.content.is_none() {
            stop_reason = StopReason::ContentFilter;
        }

        let usage = self
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(Response {
            provider,
            id: self.id,
            model: self.model,
            text: choice.message.content.unwrap_or_default(),
            status: Status::from(stop_reason),
            stop_reason,
            usage,
            metadata,
        })
    }
}

/// Send one chat completion over the OpenAI wire format.
pub(crate) async fn chat_completion(
    provider: Provider,
    client: &reqwest::Client,
    endpoint: &Endpoint,
    req: &Request,
) -> Result<Response, ClientError> {
    let model = endpoint.model_for(req);
    let body = http::encode_body(&OpenAIRequest::build(req, model), &req.extra)?;
    let url = http::endpoint(&endpoint.base_url, "chat/completions");

    tracing::debug!(provider = %provider, model, url = %url, "sending chat completion");

    let raw = http::send(
        provider,
        client
            .post(&url)
            .bearer_auth(endpoint.api_key.expose())
            .json(&body),
    )
    .await?;

    let resp: OpenAIResponse = http::decode(provider, &raw)?;
    resp.into_response(provider, raw)
}

/// Client for the OpenAI API.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    endpoint: Endpoint,
    http: reqwest::Client,
}

impl OpenAIClient {
    /// Create a client from provider settings.
    pub fn from_config(config: &ProviderConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Endpoint::from_config(Provider::OpenAI, config, OPENAI_BASE_URL)?,
            http: http::build_http(timeout, HeaderMap::new())?,
        })
    }
}

#[async_trait]
impl LlmClient for OpenAIClient {
    fn provider(&self) -> Provider {
        Provider::OpenAI
    }

    async fn complete(&self, req: &Request) -> Result<Response, ClientError> {
        chat_completion(Provider::OpenAI, &self.http, &self.endpoint, req).await
    }
}

#[cfg(test)]
mod openai_test {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::new(Provider::OpenAI, "Hello")
            .system("Be helpful")
            .temperature(0.2);

        let openai_req = OpenAIRequest::build(&req, "gpt-4o");
        assert_eq!(openai_req.model, "gpt-4o");
        assert_eq!(openai_req.messages.len(), 2); // system + user
        assert_eq!(openai_req.messages[0].role, "system");
        assert_eq!(openai_req.messages[1].role, "user");
        assert_eq!(openai_req.max_tokens, 150);

        let json = serde_json::to_value(&openai_req).unwrap();
        assert_eq!(json["messages"][1]["content"], "Hello");
        assert_eq!(json["temperature"], 0.2);
    }

    #[test]
    fn test_temperature_omitted_when_unset() {
        let req = Request::new(Provider::OpenAI, "Hello");
        let json = serde_json::to_value(OpenAIRequest::build(&req, "gpt-4o")).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_response_normalization() {
        let raw = serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hi"},
                "finish_reason": "length"
            }],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        });

        let resp: OpenAIResponse = serde_json::from_value(raw.clone()).unwrap();
        let resp = resp.into_response(Provider::OpenAI, raw).unwrap();

        assert_eq!(resp.text, "hi");
        assert_eq!(resp.status, Status::Truncated);
        assert_eq!(resp.usage.input_tokens, 3);
        assert_eq!(resp.metadata["id"], "chatcmpl-1");
    }

    #[test]
    fn test_empty_choices_is_provider_error() {
        let raw = serde_json::json!({"id": "x", "model": "m", "choices": []});
        let resp: OpenAIResponse = serde_json::from_value(raw.clone()).unwrap();
        let err = resp.into_response(Provider::OpenAI, raw).unwrap_err();
        assert!(matches!(err, ClientError::Provider { status: 200, .. }));
    }

    #[test]
    fn test_refusal_maps_to_filtered() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {"role": "assistant", "content": null, "refusal": "I can't help with that."},
                "finish_reason": "stop"
            }]
        });
        let resp: OpenAIResponse = serde_json::from_value(raw.clone()).unwrap();
        let resp = resp.into_response(Provider::OpenAI, raw).unwrap();
        assert_eq!(resp.status, Status::Filtered);
        assert_eq!(resp.text, "");
    }
}
