// ABOUTME: Defines the LlmClient trait - the seam every provider variant
// ABOUTME: implements so callers see one call surface.

use async_trait::async_trait;

use super::{Provider, Request, Response};
use crate::config::{Credential, ProviderConfig};
use crate::error::ClientError;

/// Trait for provider variants.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider this variant talks to.
    fn provider(&self) -> Provider;

    /// Issue one completion call and normalize the answer.
    async fn complete(&self, req: &Request) -> Result<Response, ClientError>;
}

/// Connection settings resolved for one variant.
#[derive(Debug, Clone)]
pub(crate) struct Endpoint {
    pub api_key: Credential,
    pub base_url: String,
    pub default_model: String,
}

impl Endpoint {
    pub fn new(provider: Provider, api_key: Credential, default_base_url: &str) -> Self {
        Self {
            api_key,
            base_url: default_base_url.to_string(),
            default_model: provider.default_model().to_string(),
        }
    }

    /// Merge a provider config over the built-in defaults.
    pub fn from_config(
        provider: Provider,
        config: &ProviderConfig,
        default_base_url: &str,
    ) -> Result<Self, ClientError> {
        if config.api_key.is_blank() {
            return Err(ClientError::missing_credential(format!(
                "{} API key must not be empty",
                provider
            )));
        }

        let mut endpoint = Self::new(provider, config.api_key.clone(), default_base_url);
        if let Some(url) = config.base_url.as_deref() {
            if url.trim().is_empty() {
                return Err(ClientError::configuration(format!(
                    "{provider} base URL must not be empty"
                )));
            }
            endpoint.base_url = url.trim().to_string();
        }
        if let Some(model) = config.default_model.as_deref() {
            endpoint.default_model = model.to_string();
        }
        Ok(endpoint)
    }

    /// The request's model, or this variant's default.
    pub fn model_for<'a>(&'a self, req: &'a Request) -> &'a str {
        req.model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.default_model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_model_overrides_default() {
        let endpoint = Endpoint::from_config(
            Provider::OpenAI,
            &ProviderConfig::new("sk").default_model("gpt-4o"),
            "https://api.openai.com/v1",
        )
        .unwrap();

        let plain = Request::new(Provider::OpenAI, "hi");
        assert_eq!(endpoint.model_for(&plain), "gpt-4o");

        let overridden = Request::new(Provider::OpenAI, "hi").model("o3-mini");
        assert_eq!(endpoint.model_for(&overridden), "o3-mini");
    }

    #[test]
    fn test_builtin_default_model() {
        let endpoint =
            Endpoint::from_config(Provider::Anthropic, &ProviderConfig::new("k"), "http://x")
                .unwrap();
        assert_eq!(endpoint.default_model, Provider::Anthropic.default_model());
        assert_eq!(endpoint.base_url, "http://x");
    }

    #[test]
    fn test_blank_key_is_auth_error() {
        let err = Endpoint::from_config(Provider::Gemini, &ProviderConfig::new(" "), "http://x")
            .unwrap_err();
        assert!(matches!(err, ClientError::Auth { status: None, .. }));
    }
}
