//! Image-to-text via the Tesseract command-line engine.
//!
//! The upload is decoded with `image` first, so a corrupt or unsupported
//! file fails with a typed error before any process is spawned. The
//! decoded image is re-encoded to PNG in memory and piped to
//! `tesseract stdin stdout`. No temp files.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::io::AsyncWriteExt;

use super::ExtractError;

pub const DEFAULT_LANGUAGE: &str = "eng";

/// Result of OCR processing.
#[derive(Debug, Clone)]
pub struct OcrOutput {
    pub text: String,
    pub char_count: usize,
    pub latency_ms: u128,
    pub width: u32,
    pub height: u32,
}

/// A located Tesseract binary plus the language pack to use.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    binary: PathBuf,
    language: String,
}

impl OcrEngine {
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Use `explicit` if given, otherwise look `tesseract` up on PATH.
    pub fn locate(explicit: Option<&Path>, language: &str) -> Result<Self, ExtractError> {
        let binary = match explicit {
            Some(path) => path.to_path_buf(),
            None => which::which("tesseract").map_err(|e| {
                ExtractError::OcrUnavailable(format!("tesseract not found on PATH ({})", e))
            })?,
        };
        log::info!("[OCR] Using {} (lang={})", binary.display(), language);
        Ok(Self::new(binary, language))
    }

    /// Run OCR on in-memory image bytes.
    pub async fn recognize(&self, image_bytes: &[u8]) -> Result<OcrOutput, ExtractError> {
        let start = Instant::now();
        let (png, width, height) = normalize_to_png(image_bytes)?;
        log::info!("[OCR] Decoded {}x{} image, {} PNG bytes", width, height, png.len());

        let mut child = tokio::process::Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                ExtractError::OcrUnavailable(format!(
                    "failed to start {}: {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ExtractError::OcrFailed("no stdin for tesseract".into()))?;
        // Tesseract may exit before reading (e.g. unknown language); its
        // stderr says why, so a failed write is only reported if it is silent.
        let write_result = stdin.write_all(&png).await;
        drop(stdin);
        if let Err(e) = &write_result {
            log::warn!("[OCR] Writing image to tesseract failed: {}", e);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ExtractError::OcrFailed(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::error!("[OCR] tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(ExtractError::OcrFailed(stderr.trim().to_string()));
        }
        if let Err(e) = write_result {
            return Err(ExtractError::OcrFailed(format!("writing image to tesseract: {}", e)));
        }

        let text = clean_output(&String::from_utf8_lossy(&output.stdout));
        let latency_ms = start.elapsed().as_millis();
        let char_count = text.chars().count();
        log::info!("[OCR] Extracted {} chars in {}ms", char_count, latency_ms);

        Ok(OcrOutput {
            text,
            char_count,
            latency_ms,
            width,
            height,
        })
    }
}

/// Decode any format `image` understands and re-encode it as PNG.
pub fn normalize_to_png(image_bytes: &[u8]) -> Result<(Vec<u8>, u32, u32), ExtractError> {
    let decoded = image::load_from_memory(image_bytes)
        .map_err(|e| ExtractError::ImageDecode(e.to_string()))?;
    let mut png = Vec::new();
    decoded
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ExtractError::ImageDecode(format!("PNG encode failed: {}", e)))?;
    Ok((png, decoded.width(), decoded.height()))
}

/// Tesseract ends every page with a form feed.
fn clean_output(raw: &str) -> String {
    raw.trim_end_matches(['\u{c}', '\n', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_jpeg() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([255, 255, 255]));
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Jpeg)
            .unwrap();
        out
    }

    #[test]
    fn jpeg_is_reencoded_as_png() {
        let (png, w, h) = normalize_to_png(&tiny_jpeg()).unwrap();
        assert_eq!((w, h), (4, 3));
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn garbage_is_an_image_decode_error() {
        let err = normalize_to_png(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ExtractError::ImageDecode(_)));
    }

    #[test]
    fn trailing_form_feed_is_stripped() {
        assert_eq!(clean_output("Hello\nWorld\n\u{c}"), "Hello\nWorld");
    }

    #[tokio::test]
    async fn missing_binary_is_unavailable() {
        let engine = OcrEngine::new("/nonexistent/bin/tesseract", DEFAULT_LANGUAGE);
        let err = engine.recognize(&tiny_jpeg()).await.unwrap_err();
        assert!(matches!(err, ExtractError::OcrUnavailable(_)), "{:?}", err);
    }

    /// Image large enough that it cannot fit in the pipe buffer.
    fn noisy_png(size: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(size, size, |x, y| {
            let v = x.wrapping_mul(2_654_435_761).wrapping_add(y.wrapping_mul(40_503)) ^ (x * y);
            image::Rgb([v as u8, (v >> 8) as u8, (v >> 16) as u8])
        });
        let mut out = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn early_exit_reports_tesseract_stderr() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("tesseract");
        std::fs::write(
            &fake,
            "#!/bin/sh\necho \"Failed loading language 'xx'\" >&2\nexit 1\n",
        )
        .unwrap();
        std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

        let engine = OcrEngine::new(fake.clone(), "xx");
        let err = engine.recognize(&noisy_png(400)).await.unwrap_err();
        assert_eq!(err, ExtractError::OcrFailed("Failed loading language 'xx'".into()));
    }

    #[tokio::test]
    async fn bad_image_fails_before_spawning() {
        let engine = OcrEngine::new("/nonexistent/bin/tesseract", DEFAULT_LANGUAGE);
        let err = engine.recognize(b"GIF89a-broken").await.unwrap_err();
        assert!(matches!(err, ExtractError::ImageDecode(_)), "{:?}", err);
    }
}
