//! Startup configuration — resolved once, then passed around explicitly.
//!
//! Sources, highest priority first:
//! 1. Command-line overrides (`--model`)
//! 2. Environment (including `.env.local` / `.env` loaded at startup)
//! 3. OS keychain (API key only, saved with `bizbrain key set`)
//! 4. Built-in defaults
//!
//! The process environment is read here and never written.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::extract::ocr::DEFAULT_LANGUAGE;
use crate::llm::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::llm::GeminiConfig;

pub const KEYRING_SERVICE: &str = "bizbrain";
pub const KEYRING_USER: &str = "gemini";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Keyring error: {0}")]
    Keyring(String),

    #[error("API key is empty")]
    EmptyKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrSettings {
    pub binary: Option<PathBuf>,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub ocr: OcrSettings,
}

impl AppConfig {
    /// Resolve from the real environment and keychain.
    pub fn from_env(model_override: Option<&str>) -> Self {
        Self::resolve(|k| std::env::var(k).ok(), keychain_api_key, model_override)
    }

    /// Resolve from an arbitrary variable lookup. The keychain is only
    /// consulted when no key is found in the environment.
    pub fn resolve(
        env: impl Fn(&str) -> Option<String>,
        keychain: impl FnOnce() -> Option<String>,
        model_override: Option<&str>,
    ) -> Self {
        let var = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = match var("GEMINI_API_KEY") {
            Some(key) => {
                log::info!("[CONFIG] API key from environment");
                Some(key)
            }
            None => {
                let key = keychain().filter(|k| !k.is_empty());
                if key.is_some() {
                    log::info!("[CONFIG] API key from OS keychain");
                } else {
                    log::warn!("[CONFIG] No Gemini API key configured");
                }
                key
            }
        };

        let model = model_override
            .map(str::to_string)
            .or_else(|| var("GEMINI_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let gemini = GeminiConfig {
            api_key,
            model,
            base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };
        let ocr = OcrSettings {
            binary: var("TESSERACT_PATH").map(PathBuf::from),
            language: var("OCR_LANG").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
        };
        log::info!("[CONFIG] {:?}", gemini);
        Self { gemini, ocr }
    }
}

/// Load `.env.local`, falling back to `.env`, from `dir`. First found wins.
///
/// Runs before logging is initialized, so outcomes go to stderr directly.
pub fn load_env_files(dir: &Path) -> Option<PathBuf> {
    for env_file in [".env.local", ".env"] {
        let path = dir.join(env_file);
        if path.exists() {
            match dotenvy::from_path(&path) {
                Ok(_) => eprintln!("[STARTUP] Loaded {}", path.display()),
                Err(e) => eprintln!("[STARTUP] Failed to load {}: {}", path.display(), e),
            }
            return Some(path);
        }
    }
    None
}

fn keychain_entry() -> Result<keyring::Entry, ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, KEYRING_USER).map_err(|e| ConfigError::Keyring(e.to_string()))
}

/// API key stored in the OS keychain, if any.
pub fn keychain_api_key() -> Option<String> {
    let entry = keychain_entry().ok()?;
    match entry.get_password() {
        Ok(key) => Some(key),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            log::warn!("[CONFIG] Keychain lookup failed: {}", e);
            None
        }
    }
}

/// Save an API key to the OS keychain.
pub fn save_api_key(api_key: &str) -> Result<(), ConfigError> {
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(ConfigError::EmptyKey);
    }
    keychain_entry()?
        .set_password(api_key)
        .map_err(|e| ConfigError::Keyring(format!("Failed to save key: {}", e)))?;
    log::info!("[CONFIG] API key saved to OS keychain");
    Ok(())
}

/// Remove the stored API key. Removing a key that is not there is not an error.
pub fn clear_api_key() -> Result<(), ConfigError> {
    match keychain_entry()?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => {
            log::info!("[CONFIG] API key removed from OS keychain");
            Ok(())
        }
        Err(e) => Err(ConfigError::Keyring(format!("Failed to remove key: {}", e))),
    }
}
