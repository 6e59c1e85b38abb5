// ABOUTME: LLM module - provider variants behind one client abstraction.
// ABOUTME: Defines types, the LlmClient trait, and provider implementations.

mod anthropic;
mod client;
mod gemini;
mod http;
mod openai;
mod openrouter;
mod types;

pub use anthropic::*;
pub use client::*;
pub use gemini::*;
pub use openai::*;
pub use openrouter::*;
pub use types::*;

#[cfg(test)]
mod types_test;
