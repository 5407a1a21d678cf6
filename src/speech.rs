//! Voice input — a recorded audio file turned into a chat transcript.
//!
//! The clip goes to the generation service inline with a transcription
//! instruction. Nothing here keeps state: a failed or empty transcript
//! just means the chat turn is skipped.

use std::path::Path;

use crate::llm::Generator;

pub const NOT_UNDERSTOOD: &str = "Sorry, I did not understand that.";
pub const UNAVAILABLE: &str = "Speech recognition service is unavailable.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transcription {
    Heard(String),
    NotUnderstood,
    Unavailable(String),
}

impl Transcription {
    /// The transcript, if anything was recognized.
    pub fn text(&self) -> Option<&str> {
        match self {
            Transcription::Heard(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// MIME type for an audio file, by extension.
pub fn mime_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "wav" => "audio/wav",
        "mp3" => "audio/mp3",
        "flac" => "audio/flac",
        "ogg" => "audio/ogg",
        "aiff" | "aif" => "audio/aiff",
        "aac" => "audio/aac",
        _ => return None,
    };
    Some(mime)
}

/// Read an audio file and transcribe it.
pub async fn transcribe_file<G: Generator>(generator: &G, path: &Path) -> Transcription {
    let Some(mime_type) = mime_type_for(path) else {
        log::warn!("[SPEECH] Unsupported audio file: {}", path.display());
        return Transcription::Unavailable(format!(
            "unsupported audio format: {} (use wav, mp3, flac, ogg, aiff or aac)",
            path.display()
        ));
    };
    let audio = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("[SPEECH] Could not read {}: {}", path.display(), e);
            return Transcription::Unavailable(format!("could not read {}: {}", path.display(), e));
        }
    };
    transcribe_bytes(generator, &audio, mime_type).await
}

pub async fn transcribe_bytes<G: Generator>(
    generator: &G,
    audio: &[u8],
    mime_type: &str,
) -> Transcription {
    match generator.transcribe(audio, mime_type).await {
        Ok(text) if text.trim().is_empty() => {
            log::info!("[SPEECH] Empty transcript");
            Transcription::NotUnderstood
        }
        Ok(text) => {
            log::info!("[SPEECH] Transcript: {} chars", text.len());
            Transcription::Heard(text.trim().to_string())
        }
        Err(e) => {
            log::error!("[SPEECH] Transcription failed: {}", e);
            Transcription::Unavailable(e.to_string())
        }
    }
}
