// ABOUTME: Client configuration - per-provider credentials, endpoints and
// ABOUTME: defaults, built explicitly or read once from the environment.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::ClientError;
use crate::llm::Provider;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ENV_TIMEOUT_SECS: &str = "PARLEY_TIMEOUT_SECS";
const ENV_GEMINI_KEY_FALLBACK: &str = "GOOGLE_API_KEY";
const ENV_OPENROUTER_REFERER: &str = "OPENROUTER_REFERER";
const ENV_OPENROUTER_TITLE: &str = "OPENROUTER_TITLE";

/// A provider API key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for building auth headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Settings for one provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Credential,
    pub base_url: Option<String>,
    pub default_model: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Credential::new(api_key),
            base_url: None,
            default_model: None,
        }
    }

    /// Point the provider at another endpoint (proxy, mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Model used when a request does not name one.
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }
}

/// App identification headers sent to OpenRouter.
#[derive(Debug, Clone, Default)]
pub struct OpenRouterHeaders {
    pub referer: Option<String>,
    pub title: Option<String>,
}

/// Configuration handed to [`crate::ApiClient::new`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub providers: BTreeMap<Provider, ProviderConfig>,
    pub timeout: Duration,
    pub openrouter: OpenRouterHeaders,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            providers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            openrouter: OpenRouterHeaders::default(),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register settings for a provider, replacing any earlier entry.
    pub fn provider(mut self, provider: Provider, config: ProviderConfig) -> Self {
        self.providers.insert(provider, config);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn openrouter_headers(mut self, headers: OpenRouterHeaders) -> Self {
        self.openrouter = headers;
        self
    }

    /// Load a `.env` file if present, then read the process environment.
    pub fn from_env() -> Result<Self, ClientError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(ClientError::configuration(format!(
                    "failed to load .env file: {e}"
                )));
            }
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Providers without an API key are left out; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::new();

        for provider in Provider::ALL {
            let prefix = provider.env_prefix();
            let api_key = read(format!("{prefix}_API_KEY").as_str()).or_else(|| match provider {
                Provider::Gemini => read(ENV_GEMINI_KEY_FALLBACK),
                _ => None,
            });
            let Some(api_key) = api_key else {
                continue;
            };

            let mut entry = ProviderConfig::new(api_key);
            entry.base_url = read(format!("{prefix}_BASE_URL").as_str());
            entry.default_model = read(format!("{prefix}_MODEL").as_str());
            config.providers.insert(provider, entry);
        }

        if let Some(value) = read(ENV_TIMEOUT_SECS) {
            config.timeout = parse_timeout_seconds(ENV_TIMEOUT_SECS, &value)?;
        }

        config.openrouter = OpenRouterHeaders {
            referer: read(ENV_OPENROUTER_REFERER),
            title: read(ENV_OPENROUTER_TITLE),
        };

        Ok(config)
    }
}

pub(crate) fn parse_timeout_seconds(name: &str, value: &str) -> Result<Duration, ClientError> {
    let parsed = value.trim().parse::<u64>().map_err(|_| {
        ClientError::configuration(format!("{name} must be a positive integer in seconds"))
    })?;
    if parsed == 0 {
        return Err(ClientError::configuration(format!(
            "{name} must be greater than 0 seconds"
        )));
    }
    Ok(Duration::from_secs(parsed))
}
