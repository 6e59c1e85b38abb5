// ABOUTME: Root module for parley - one async client over many LLM providers.
// ABOUTME: Re-exports the public types from submodules.

pub mod api_client;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod prelude;

pub use api_client::ApiClient;
pub use error::ClientError;
