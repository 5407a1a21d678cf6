//! LLM domain — prompt templates and the Gemini generation client.
//!
//! External code should only use the items exported here.
//!
//!   - prompts.rs  — fixed instruction per sub-mode
//!   - gemini.rs   — `generateContent` over HTTPS
//!   - provider.rs — `Generator` trait + fail-soft helper
//!   - error.rs    — closed set of failure kinds

pub mod error;
pub mod gemini;
pub mod prompts;
pub mod provider;
pub mod types;

pub use error::LlmError;
pub use gemini::{GeminiClient, GeminiConfig};
pub use provider::{generate_or_empty, Generator, Reply};
