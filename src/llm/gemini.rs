//! Gemini client — one non-streaming `generateContent` call per request.
//!
//! Key differences from an OpenAI-style API:
//! - API key in URL query param, not header
//! - Text lives in `candidates[0].content.parts[*].text`
//! - Token usage in `usageMetadata`
//! - A refused prompt comes back as 200 with `promptFeedback.blockReason`

use base64::Engine;
use std::time::Instant;

use super::error::{classify_failure, LlmError};
use super::prompts::{PING_PROMPT, TRANSCRIBE_PROMPT};
use super::types::GenerateContentResponse;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Everything the client needs, built once at startup and handed in.
#[derive(Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

// Hand-written so the key never ends up in logs.
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &self.api_key.as_ref().map(|k| format!("<{} chars>", k.len())))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

pub struct GeminiClient {
    http: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, ...).
    pub fn with_http(config: GeminiConfig, http: reqwest::Client) -> Self {
        Self { http, config }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send a text-only prompt and return the generated text.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        log::info!("[LLM] Prompt: {} chars", prompt.len());
        self.send(serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": prompt
                        }
                    ]
                }
            ]
        }))
        .await
    }

    /// Send an audio clip inline and ask for its transcript.
    pub async fn transcribe_audio(&self, audio: &[u8], mime_type: &str) -> Result<String, LlmError> {
        log::info!("[LLM] Audio: {} bytes ({})", audio.len(), mime_type);
        let data = base64::engine::general_purpose::STANDARD.encode(audio);
        self.send(serde_json::json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "text": TRANSCRIBE_PROMPT
                        },
                        {
                            "inlineData": {
                                "mimeType": mime_type,
                                "data": data
                            }
                        }
                    ]
                }
            ]
        }))
        .await
    }

    /// Minimal request proving the key and model answer.
    pub async fn check_connection(&self) -> Result<(), LlmError> {
        let reply = self.generate_text(PING_PROMPT).await?;
        log::info!("[LLM] Connection check replied with {} chars", reply.len());
        Ok(())
    }

    async fn send(&self, body: serde_json::Value) -> Result<String, LlmError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(LlmError::MissingApiKey)?;

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        );
        log::info!("[LLM] Model: {}", self.config.model);

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                // without_url: the query string carries the key
                let e = e.without_url();
                log::error!("[LLM] HTTP request failed: {}", e);
                LlmError::Network(e.to_string())
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Network(e.without_url().to_string()))?;

        if !status.is_success() {
            let err = classify_failure(status.as_u16(), &text);
            log::error!("[LLM] Gemini API returned {}: {}", status, err);
            return Err(err);
        }

        log::info!("[LLM] Response in {}ms ({} bytes)", start.elapsed().as_millis(), text.len());
        parse_generate_response(&text)
    }
}

/// Turn a successful `generateContent` body into the answer text.
pub fn parse_generate_response(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

    if let Some(usage) = &parsed.usage_metadata {
        log::info!("[LLM] Input tokens: {}", usage.prompt_token_count);
        log::info!("[LLM] Output tokens: {}", usage.candidates_token_count);
    }

    let Some(candidate) = parsed.candidates.first() else {
        let reason = parsed
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(LlmError::Blocked);
        return Err(reason
            .unwrap_or_else(|| LlmError::MalformedResponse("response has no candidates".into())));
    };

    match candidate.text() {
        Some(text) if !(text.is_empty() && candidate.was_blocked()) => Ok(text),
        _ if candidate.was_blocked() => Err(LlmError::Blocked(
            candidate.finish_reason.clone().unwrap_or_default(),
        )),
        _ => Err(LlmError::MalformedResponse("candidate has no content".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_all_text_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Dear "}, {"text": "Sir,"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 3}
        }"#;
        assert_eq!(parse_generate_response(body).unwrap(), "Dear Sir,");
    }

    #[test]
    fn prompt_block_is_reported() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            parse_generate_response(body),
            Err(LlmError::Blocked("SAFETY".into()))
        );
    }

    #[test]
    fn safety_finish_without_content_is_blocked() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert_eq!(
            parse_generate_response(body),
            Err(LlmError::Blocked("SAFETY".into()))
        );
    }

    #[test]
    fn empty_candidates_is_malformed() {
        assert!(matches!(
            parse_generate_response(r#"{"candidates": []}"#),
            Err(LlmError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_generate_response("<html>"),
            Err(LlmError::MalformedResponse(_))
        ));
    }

    #[test]
    fn debug_hides_api_key() {
        let config = GeminiConfig {
            api_key: Some("AIza-secret".into()),
            ..Default::default()
        };
        let shown = format!("{:?}", config);
        assert!(!shown.contains("AIza-secret"));
        assert!(shown.contains("<11 chars>"));
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let client = GeminiClient::new(GeminiConfig::default());
        assert_eq!(client.generate_text("hi").await, Err(LlmError::MissingApiKey));
    }
}
