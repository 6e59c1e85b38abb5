// ABOUTME: Tests for the provider enum, request builder and response helpers.
// ABOUTME: Verifies provider parsing and normalized status mapping.

use super::*;
use crate::error::ClientError;

#[test]
fn test_provider_parsing_is_case_insensitive() {
    assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
    assert_eq!(" Anthropic ".parse::<Provider>().unwrap(), Provider::Anthropic);
    assert_eq!("GEMINI".parse::<Provider>().unwrap(), Provider::Gemini);
    assert_eq!("openrouter".parse::<Provider>().unwrap(), Provider::OpenRouter);
}

#[test]
fn test_unknown_provider_is_configuration_error() {
    let err = "unknown".parse::<Provider>().unwrap_err();
    match err {
        ClientError::Configuration(message) => {
            assert!(message.contains("unknown"));
            assert!(message.contains("openai, anthropic, gemini, openrouter"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[test]
fn test_provider_round_trips_through_display() {
    for provider in Provider::ALL {
        assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
    }
}

#[test]
fn test_provider_serde_uses_identifier() {
    assert_eq!(
        serde_json::to_value(Provider::OpenRouter).unwrap(),
        serde_json::json!("openrouter")
    );
}

#[test]
fn test_request_for_provider() {
    let req = Request::for_provider("anthropic", "hello").unwrap();
    assert_eq!(req.provider, Provider::Anthropic);
    assert_eq!(req.messages, vec![Message::user("hello")]);
    assert_eq!(req.model, None);

    assert!(matches!(
        Request::for_provider("unknown", "hello"),
        Err(ClientError::Configuration(_))
    ));
}

#[test]
fn test_request_builder() {
    let req = Request::new(Provider::OpenAI, "Question?")
        .model("gpt-4o")
        .system("You are a debater")
        .max_tokens(1000)
        .temperature(0.7)
        .param("top_p", serde_json::json!(0.9));

    assert_eq!(req.model.as_deref(), Some("gpt-4o"));
    assert_eq!(req.system.as_deref(), Some("You are a debater"));
    assert_eq!(req.max_tokens_or_default(), 1000);
    assert_eq!(req.temperature, Some(0.7));
    assert_eq!(req.extra["top_p"], 0.9);
}

#[test]
fn test_max_tokens_default() {
    let req = Request::new(Provider::OpenAI, "hi");
    assert_eq!(req.max_tokens_or_default(), DEFAULT_MAX_TOKENS);
    assert_eq!(DEFAULT_MAX_TOKENS, 150);
}

#[test]
fn test_status_from_stop_reason() {
    assert_eq!(Status::from(StopReason::EndTurn), Status::Ok);
    assert_eq!(Status::from(StopReason::StopSequence), Status::Ok);
    assert_eq!(Status::from(StopReason::Other), Status::Ok);
    assert_eq!(Status::from(StopReason::MaxTokens), Status::Truncated);
    assert_eq!(Status::from(StopReason::ContentFilter), Status::Filtered);
}
