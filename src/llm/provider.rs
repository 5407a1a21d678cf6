//! Generator trait — the seam between the shell and the generation service.
//!
//! `GeminiClient` is the only real implementation; tests plug in fakes.

use std::future::Future;

use super::error::LlmError;
use super::gemini::GeminiClient;

pub trait Generator {
    /// Generate text for a prompt.
    fn generate(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Transcribe an audio clip.
    fn transcribe(
        &self,
        audio: &[u8],
        mime_type: &str,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

impl Generator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate_text(prompt).await
    }

    async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String, LlmError> {
        self.transcribe_audio(audio, mime_type).await
    }
}

/// Outcome of a request whose failure is shown to the user, not propagated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub error: Option<LlmError>,
}

impl Reply {
    /// The line shown to the user when the request failed.
    pub fn diagnostic(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("Error communicating with Gemini API: {}", e))
    }
}

/// Generate text, collapsing any failure into an empty reply plus the error.
pub async fn generate_or_empty<G: Generator>(generator: &G, prompt: &str) -> Reply {
    match generator.generate(prompt).await {
        Ok(text) => Reply { text, error: None },
        Err(e) => {
            log::warn!("[LLM] Generation failed (recoverable: {}): {}", e.is_recoverable(), e);
            Reply {
                text: String::new(),
                error: Some(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl Generator for Failing {
        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Network("connection refused".into()))
        }

        async fn transcribe(&self, _audio: &[u8], _mime_type: &str) -> Result<String, LlmError> {
            Err(LlmError::Network("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn failure_collapses_to_empty_text() {
        let reply = generate_or_empty(&Failing, "hello").await;
        assert_eq!(reply.text, "");
        assert_eq!(
            reply.diagnostic().as_deref(),
            Some("Error communicating with Gemini API: network failure: connection refused")
        );
    }
}
