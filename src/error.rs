// ABOUTME: Defines the categorized error type returned by every client call.
// ABOUTME: Raw transport and provider failures are folded into these variants.

/// Boxed underlying cause kept on transport errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the API client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Invalid setup, detected before any network call.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or rejected credential.
    #[error("Authentication error{}: {message}", fmt_status(.status))]
    Auth { status: Option<u16>, message: String },

    /// Provider throttled the request.
    #[error("Rate limited ({status}): {message}")]
    RateLimit {
        status: u16,
        message: String,
        retry_after: Option<u64>,
    },

    /// The request never produced a readable HTTP response.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Provider answered with an error status or an unexpected body.
    #[error("Provider error ({status}): {message}")]
    Provider {
        status: u16,
        message: String,
        metadata: serde_json::Value,
    },
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

impl ClientError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn missing_credential(message: impl Into<String>) -> Self {
        Self::Auth {
            status: None,
            message: message.into(),
        }
    }

    /// HTTP status attached to this error, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Auth { status, .. } => *status,
            Self::RateLimit { status, .. } | Self::Provider { status, .. } => Some(*status),
            Self::Configuration(_) | Self::Transport { .. } => None,
        }
    }

    /// Whether the error happened before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Auth { status: None, .. })
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else if err.is_connect() {
            "connection failed".to_string()
        } else if err.is_body() || err.is_decode() {
            "failed to read response body".to_string()
        } else {
            "request failed".to_string()
        };

        Self::Transport {
            message,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_display_with_and_without_status() {
        let remote = ClientError::Auth {
            status: Some(401),
            message: "invalid x-api-key".to_string(),
        };
        assert_eq!(
            remote.to_string(),
            "Authentication error (401): invalid x-api-key"
        );

        let local = ClientError::missing_credential("OPENAI_API_KEY is not set");
        assert_eq!(
            local.to_string(),
            "Authentication error: OPENAI_API_KEY is not set"
        );
        assert!(local.is_local());
        assert!(!remote.is_local());
    }

    #[test]
    fn test_status_accessor() {
        let err = ClientError::Provider {
            status: 500,
            message: "boom".to_string(),
            metadata: serde_json::Value::Null,
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(ClientError::configuration("bad").status(), None);
    }
}
