//! Extraction adapters — uploaded file bytes in, text or a table out.
//!
//! Each adapter is stateless and handles exactly one file per call.
//! Several uploads are several independent calls.

pub mod ocr;
pub mod pdf;
pub mod table;

use std::path::Path;
use thiserror::Error;

pub use ocr::{OcrEngine, OcrOutput};
pub use pdf::{extract_pdf_text, PdfText};
pub use table::Table;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("unsupported or corrupt image: {0}")]
    ImageDecode(String),

    #[error("OCR engine unavailable: {0}")]
    OcrUnavailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("invalid PDF: {0}")]
    PdfParse(String),

    #[error("invalid CSV: {0}")]
    CsvParse(String),
}

/// One uploaded file: display name plus its raw bytes.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn read(path: &Path) -> Result<Self, ExtractError> {
        let bytes = std::fs::read(path).map_err(|e| ExtractError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        log::info!("[EXTRACT] Read {} ({} bytes)", name, bytes.len());
        Ok(Self { name, bytes })
    }
}
