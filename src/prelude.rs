// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use parley::prelude::*;` to get started quickly.

pub use crate::api_client::ApiClient;
pub use crate::config::{ClientConfig, Credential, OpenRouterHeaders, ProviderConfig};
pub use crate::error::ClientError;
pub use crate::llm::{
    AnthropicClient, GeminiClient, LlmClient, Message, OpenAIClient, OpenRouterClient, Provider,
    Request, Response, Role, Status, StopReason, Usage,
};
pub use crate::logging::{LogFormat, LoggingConfig, init_logging};
