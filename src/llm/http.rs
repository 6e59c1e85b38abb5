// ABOUTME: Shared HTTP plumbing for provider variants - sending a JSON body,
// ABOUTME: classifying error statuses and decoding provider response shapes.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use super::Provider;
use crate::error::ClientError;

const MAX_ERROR_MESSAGE_LEN: usize = 256;

/// Build the pooled HTTP client shared by one provider variant.
pub(crate) fn build_http(
    timeout: Duration,
    headers: reqwest::header::HeaderMap,
) -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .default_headers(headers)
        .build()
        .map_err(|e| ClientError::configuration(format!("failed to build HTTP client: {e}")))
}

/// Join a base URL and a path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Serialize a wire request and lay the caller's extra fields over it.
pub(crate) fn encode_body<T: Serialize>(
    wire: &T,
    extra: &Map<String, Value>,
) -> Result<Value, ClientError> {
    let mut body = serde_json::to_value(wire)
        .map_err(|e| ClientError::configuration(format!("failed to encode request: {e}")))?;

    if let Value::Object(ref mut fields) = body {
        for (key, value) in extra {
            fields.insert(key.clone(), value.clone());
        }
    }

    Ok(body)
}

/// Send a prepared request and return the decoded JSON body of a 2xx answer.
pub(crate) async fn send(
    provider: Provider,
    builder: reqwest::RequestBuilder,
) -> Result<Value, ClientError> {
    let response = builder.send().await.map_err(|e| {
        let err = ClientError::from(e);
        tracing::error!(provider = %provider, error = %err, "request to provider failed");
        err
    })?;

    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok());
    let body = response.text().await?;

    if !status.is_success() {
        let err = classify(status, &body, retry_after);
        tracing::warn!(provider = %provider, status = status.as_u16(), error = %err, "provider returned an error status");
        return Err(err);
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Provider {
        status: status.as_u16(),
        message: format!("response body is not valid JSON: {e}"),
        metadata: json!({ "status": status.as_u16(), "body": body }),
    })
}

/// Decode a provider success body into its wire response type.
pub(crate) fn decode<T: DeserializeOwned>(
    provider: Provider,
    raw: &Value,
) -> Result<T, ClientError> {
    T::deserialize(raw).map_err(|e| ClientError::Provider {
        status: StatusCode::OK.as_u16(),
        message: format!("unexpected {provider} response shape: {e}"),
        metadata: json!({ "status": StatusCode::OK.as_u16(), "body": raw }),
    })
}

/// Map a non-2xx status and its body onto the error taxonomy.
pub(crate) fn classify(status: StatusCode, body: &str, retry_after: Option<u64>) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(error_message)
        .map(str::to_string)
        .unwrap_or_else(|| {
            let text = truncate_message(body);
            if text.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            } else {
                text
            }
        });

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Auth {
            status: Some(status.as_u16()),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => ClientError::RateLimit {
            status: status.as_u16(),
            message,
            retry_after,
        },
        _ => ClientError::Provider {
            status: status.as_u16(),
            message,
            metadata: json!({
                "status": status.as_u16(),
                "body": parsed.unwrap_or_else(|| Value::String(body.to_string())),
            }),
        },
    }
}

// OpenAI, Anthropic, Gemini and OpenRouter all nest it under `error.message`.
fn error_message(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str)
}

fn truncate_message(body: &str) -> String {
    let compact = body.trim().replace('\n', " ");
    compact.chars().take(MAX_ERROR_MESSAGE_LEN).collect()
}
