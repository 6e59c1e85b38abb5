// ABOUTME: ApiClient - the single call surface over every configured provider.
// ABOUTME: Dispatches each Request to the variant registered for its provider.

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::Instrument;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::llm::{
    AnthropicClient, GeminiClient, LlmClient, OpenAIClient, OpenRouterClient, Provider, Request,
    Response,
};

/// Uniform client over the configured providers.
///
/// Holds no mutable state, so one instance can serve concurrent calls.
#[derive(Clone, Default)]
pub struct ApiClient {
    variants: BTreeMap<Provider, Arc<dyn LlmClient>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("providers", &self.providers())
            .finish()
    }
}

impl ApiClient {
    /// Build one variant per provider that has settings in `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut client = Self::default();

        for (provider, settings) in &config.providers {
            let variant: Arc<dyn LlmClient> = match provider {
                Provider::OpenAI => Arc::new(OpenAIClient::from_config(settings, config.timeout)?),
                Provider::Anthropic => {
                    Arc::new(AnthropicClient::from_config(settings, config.timeout)?)
                }
                Provider::Gemini => Arc::new(GeminiClient::from_config(settings, config.timeout)?),
                Provider::OpenRouter => Arc::new(OpenRouterClient::from_config(
                    settings,
                    &config.openrouter,
                    config.timeout,
                )?),
            };
            client.variants.insert(*provider, variant);
        }

        tracing::debug!(providers = ?client.providers(), "api client ready");
        Ok(client)
    }

    /// Read configuration from the environment and build the client.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Register a variant, replacing any existing one for its provider.
    pub fn with_client(mut self, variant: impl LlmClient + 'static) -> Self {
        self.variants.insert(variant.provider(), Arc::new(variant));
        self
    }

    /// Providers that can be called.
    pub fn providers(&self) -> Vec<Provider> {
        self.variants.keys().copied().collect()
    }

    /// Send one request to its provider.
    pub async fn complete(&self, req: &Request) -> Result<Response, ClientError> {
        let variant = self.variants.get(&req.provider).ok_or_else(|| {
            ClientError::missing_credential(format!(
                "no credential configured for provider '{}' (set {}_API_KEY)",
                req.provider,
                req.provider.env_prefix()
            ))
        })?;

        let span = tracing::info_span!("complete", provider = %req.provider);
        let result = variant.complete(req).instrument(span).await;

        if let Ok(ref resp) = result {
            tracing::debug!(
                provider = %resp.provider,
                model = %resp.model,
                status = ?resp.status,
                input_tokens = resp.usage.input_tokens,
                output_tokens = resp.usage.output_tokens,
                "completion finished"
            );
        }
        result
    }

    /// Send independent requests concurrently. Results keep input order.
    pub async fn complete_all(&self, requests: &[Request]) -> Vec<Result<Response, ClientError>> {
        join_all(requests.iter().map(|req| self.complete(req))).await
    }
}
