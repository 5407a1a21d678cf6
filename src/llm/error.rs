//! Failure kinds for the generation service.
//!
//! Every way a request can go wrong maps to exactly one variant, so the
//! shell can tell a missing key from a dead network from a refusal.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LlmError {
    #[error("no Gemini API key configured (set GEMINI_API_KEY or run `bizbrain key set`)")]
    MissingApiKey,

    #[error("network failure: {0}")]
    Network(String),

    #[error("authentication rejected ({status}): {message}")]
    Authentication { status: u16, message: String },

    #[error("quota or rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("request blocked by the service: {0}")]
    Blocked(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// True for failures that may succeed if the user simply tries again.
    pub fn is_recoverable(&self) -> bool {
        match self {
            LlmError::Network(_) | LlmError::RateLimited(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Map a non-success HTTP response onto an error kind.
///
/// Gemini answers a bad key with 400 INVALID_ARGUMENT rather than 401,
/// so the body is inspected for the `API_KEY_INVALID` reason as well.
pub fn classify_failure(status: u16, body: &str) -> LlmError {
    let message = error_message(body);
    match status {
        401 | 403 => LlmError::Authentication { status, message },
        400 if body.contains("API_KEY_INVALID") || body.contains("API key not valid") => {
            LlmError::Authentication { status, message }
        }
        429 => LlmError::RateLimited(message),
        _ => LlmError::Api { status, message },
    }
}

/// Pull `error.message` out of a Google API error body, or fall back to
/// the first 200 characters of the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.get("error")?
                .get("message")?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}
