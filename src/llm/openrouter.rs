// ABOUTME: OpenRouter API client wrapping the OpenAI-compatible API.
// ABOUTME: Supports custom HTTP-Referer and X-Title headers for app identification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};

use super::client::{Endpoint, LlmClient};
use super::openai::chat_completion;
use super::{http, Provider, Request, Response};
use crate::config::{OpenRouterHeaders, ProviderConfig};
use crate::error::ClientError;

/// Base URL for OpenRouter's OpenAI-compatible API.
pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Client for OpenRouter API.
/// OpenRouter provides a unified API that routes to various LLM providers.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    endpoint: Endpoint,
    http: reqwest::Client,
}

fn app_headers(app: &OpenRouterHeaders) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();

    if let Some(referer) = app.referer.as_deref() {
        let value = HeaderValue::from_str(referer).map_err(|_| {
            ClientError::configuration("OpenRouter referer is not a valid header value")
        })?;
        headers.insert("HTTP-Referer", value);
    }

    if let Some(title) = app.title.as_deref() {
        let value = HeaderValue::from_str(title).map_err(|_| {
            ClientError::configuration("OpenRouter title is not a valid header value")
        })?;
        headers.insert("X-Title", value);
    }

    Ok(headers)
}

impl OpenRouterClient {
    /// Create a client from provider settings and app identification headers.
    pub fn from_config(
        config: &ProviderConfig,
        app: &OpenRouterHeaders,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            endpoint: Endpoint::from_config(Provider::OpenRouter, config, OPENROUTER_BASE_URL)?,
            http: http::build_http(timeout, app_headers(app)?)?,
        })
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    fn provider(&self) -> Provider {
        Provider::OpenRouter
    }

    async fn complete(&self, req: &Request) -> Result<Response, ClientError> {
        chat_completion(Provider::OpenRouter, &self.http, &self.endpoint, req).await
    }
}

#[cfg(test)]
mod openrouter_test {
    use super::*;

    #[test]
    fn test_app_headers() {
        let headers = app_headers(&OpenRouterHeaders {
            referer: Some("https://debate.example".to_string()),
            title: Some("Debate Tool".to_string()),
        })
        .unwrap();
        assert_eq!(headers["HTTP-Referer"], "https://debate.example");
        assert_eq!(headers["X-Title"], "Debate Tool");

        assert!(app_headers(&OpenRouterHeaders::default()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_header_is_configuration_error() {
        let err = app_headers(&OpenRouterHeaders {
            referer: None,
            title: Some("bad\ntitle".to_string()),
        })
        .unwrap_err();
        assert!(matches!(err, ClientError::Configuration(_)));
    }
}
