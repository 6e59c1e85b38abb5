// ABOUTME: Google Gemini API client implementation.
// ABOUTME: Implements LlmClient for Gemini models via generateContent.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

use super::client::{Endpoint, LlmClient};
use super::{http, Message, Provider, Request, Response, Role, Status, StopReason, Usage};
use crate::config::ProviderConfig;
use crate::error::ClientError;

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<GeminiContent>,
    pub generation_config: GeminiGenerationConfig,
}

/// Gemini content (message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

/// Gemini content part. Non-text parts read back with `text: None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Gemini generation config.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiGenerationConfig {
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<GeminiUsageMetadata>,
    #[serde(default)]
    pub prompt_feedback: Option<GeminiPromptFeedback>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub response_id: Option<String>,
}

/// Gemini response candidate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Set when the prompt itself was blocked.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiPromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Gemini usage metadata.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
}

fn convert_message(msg: &Message) -> GeminiContent {
    let role = match msg.role {
        Role::User => "user",
        Role::Assistant => "model",
    };

    GeminiContent {
        role: Some(role.to_string()),
        parts: vec![GeminiPart {
            text: Some(msg.content.clone()),
        }],
    }
}

impl GeminiRequest {
    pub fn build(req: &Request) -> Self {
        GeminiRequest {
            contents: req.messages.iter().map(convert_message).collect(),
            system_instruction: req.system.as_ref().map(|s| GeminiContent {
                role: None,
                parts: vec![GeminiPart {
                    text: Some(s.clone()),
                }],
            }),
            generation_config: GeminiGenerationConfig {
                max_output_tokens: req.max_tokens_or_default(),
                temperature: req.temperature,
            },
        }
    }
}

fn parse_stop_reason(s: Option<&str>) -> StopReason {
    match s {
        Some("STOP") => StopReason::EndTurn,
        Some("MAX_TOKENS") => StopReason::MaxTokens,
        Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT")
        | Some("SPII") => StopReason::ContentFilter,
        _ => StopReason::Other,
    }
}

impl GeminiResponse {
    /// Normalize. `model` is the requested model, used when the body omits it.
    pub fn into_response(
        self,
        model: &str,
        metadata: serde_json::Value,
    ) -> Result<Response, ClientError> {
        let (text, stop_reason) = match self.candidates.into_iter().next() {
            Some(candidate) => {
                let text = candidate
                    .content
                    .map(|c| {
                        c.parts
                            .into_iter()
                            .filter_map(|p| p.text)
                            .collect::<Vec<_>>()
                            .join("")
                    })
                    .unwrap_or_default();
                (text, parse_stop_reason(candidate.finish_reason.as_deref()))
            }
            None if self
                .prompt_feedback
                .as_ref()
                .is_some_and(|f| f.block_reason.is_some()) =>
            {
                (String::new(), StopReason::ContentFilter)
            }
            None => {
                return Err(ClientError::Provider {
                    status: 200,
                    message: "gemini response contained no candidates".to_string(),
                    metadata: serde_json::json!({ "status": 200, "body": metadata }),
                });
            }
        };

        let usage = self
            .usage_metadata
            .map(|u| Usage {
                input_tokens: u.prompt_token_count,
                output_tokens: u.candidates_token_count,
            })
            .unwrap_or_default();

        Ok(Response {
            provider: Provider::Gemini,
            id: self
                .response_id
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            model: self.model_version.unwrap_or_else(|| model.to_string()),
            text,
            status: Status::from(stop_reason),
            stop_reason,
            usage,
            metadata,
        })
    }
}

/// Client for the Google Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: Endpoint,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Create a client from provider settings.
    pub fn from_config(config: &ProviderConfig, timeout: Duration) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Endpoint::from_config(Provider::Gemini, config, GEMINI_BASE_URL)?,
            http: http::build_http(timeout, HeaderMap::new())?,
        })
    }

    /// Build the endpoint URL for a given model and method.
    fn url(&self, model: &str, method: &str) -> String {
        http::endpoint(&self.endpoint.base_url, &format!("models/{model}:{method}"))
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn complete(&self, req: &Request) -> Result<Response, ClientError> {
        let model = self.endpoint.model_for(req);
        let body = http::encode_body(&GeminiRequest::build(req), &req.extra)?;
        // Key travels in a header so it never shows up in logged URLs.
        let url = self.url(model, "generateContent");

        tracing::debug!(provider = %Provider::Gemini, model, url = %url, "sending generateContent");

        let raw = http::send(
            Provider::Gemini,
            self.http
                .post(&url)
                .header("x-goog-api-key", self.endpoint.api_key.expose())
                .json(&body),
        )
        .await?;

        let resp: GeminiResponse = http::decode(Provider::Gemini, &raw)?;
        resp.into_response(model, raw)
    }
}
