//! Presentation shell — the feature handlers behind every command.
//!
//! Each handler takes the current inputs, runs the adapter and/or the
//! generator, and writes what the user should see to the output sink.
//! Failures are rendered as messages; only a broken output sink is an
//! error here.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::OcrSettings;
use crate::extract::{extract_pdf_text, ExtractError, OcrEngine, PdfText, Table, Upload};
use crate::llm::prompts::{chat_prompt, content_prompt, csv_prompt, ContentKind, Personality};
use crate::llm::{generate_or_empty, Generator};
use crate::speech::{self, Transcription};

/// Where a chat message comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Text(String),
    Voice(PathBuf),
}

/// How generated replies reach the system clipboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMode {
    Off,
    /// Copy each reply as it arrives, through one clipboard handle kept
    /// for the whole session.
    Session,
    /// Copy the last reply when the command finishes. On Linux the
    /// process owns the selection, so `finish` blocks until another
    /// program takes the clipboard over.
    OnFinish,
}

impl CopyMode {
    pub fn for_invocation(copy: bool, one_shot: bool) -> Self {
        match (copy, one_shot) {
            (false, _) => CopyMode::Off,
            (true, false) => CopyMode::Session,
            (true, true) => CopyMode::OnFinish,
        }
    }
}

pub struct Shell<G, W> {
    generator: G,
    out: W,
    ocr: OcrSettings,
    copy_mode: CopyMode,
    clipboard: Option<arboard::Clipboard>,
    pending_copy: Option<String>,
}

impl<G: Generator, W: Write> Shell<G, W> {
    pub fn new(generator: G, out: W, ocr: OcrSettings) -> Self {
        Self {
            generator,
            out,
            ocr,
            copy_mode: CopyMode::Off,
            clipboard: None,
            pending_copy: None,
        }
    }

    pub fn copy_replies(mut self, mode: CopyMode) -> Self {
        self.copy_mode = mode;
        self
    }

    /// Flush a deferred clipboard copy. Call once the command is done.
    pub fn finish(&mut self) -> io::Result<()> {
        let Some(text) = self.pending_copy.take() else {
            return Ok(());
        };
        if cfg!(target_os = "linux") {
            writeln!(
                self.out,
                "📋 Reply copied. Waiting until another program takes the clipboard (Ctrl+C to quit)..."
            )?;
            self.out.flush()?;
        }
        self.copy_to_clipboard(&text, true);
        Ok(())
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn greet(&mut self, name: &str) -> io::Result<()> {
        let name = name.trim();
        if !name.is_empty() {
            writeln!(self.out, "Hi {}! 👋", name)?;
        }
        Ok(())
    }

    /// One chat turn. Returns the reply, or `None` when nothing was sent.
    pub async fn chat(
        &mut self,
        personality: Personality,
        input: ChatInput,
    ) -> io::Result<Option<String>> {
        let text = match input {
            ChatInput::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                writeln!(self.out, "You: {}", text)?;
                text
            }
            ChatInput::Voice(path) => {
                writeln!(self.out, "🎙 Listening to {}...", path.display())?;
                match speech::transcribe_file(&self.generator, &path).await {
                    Transcription::Heard(text) => {
                        writeln!(self.out, "You said: {}", text)?;
                        text
                    }
                    Transcription::NotUnderstood => {
                        writeln!(self.out, "{}", speech::NOT_UNDERSTOOD)?;
                        return Ok(None);
                    }
                    Transcription::Unavailable(reason) => {
                        writeln!(self.out, "{} ({})", speech::UNAVAILABLE, reason)?;
                        return Ok(None);
                    }
                }
            }
        };

        let reply = self.ask(&chat_prompt(personality, &text)).await?;
        writeln!(self.out, "BizBrain AI: {}", reply)?;
        Ok(Some(reply))
    }

    /// Generate a document of `kind` about `topic`.
    pub async fn write_content(
        &mut self,
        kind: ContentKind,
        topic: &str,
    ) -> io::Result<Option<String>> {
        if topic.trim().is_empty() {
            writeln!(self.out, "Enter the topic / purpose / keywords first.")?;
            return Ok(None);
        }
        let reply = self.ask(&content_prompt(kind, topic)).await?;
        writeln!(self.out, "📝 Generated Output")?;
        writeln!(self.out, "{}", reply)?;
        Ok(Some(reply))
    }

    /// OCR each image independently; one bad file does not stop the rest.
    pub async fn analyze_images(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        let engine = match OcrEngine::locate(self.ocr.binary.as_deref(), &self.ocr.language) {
            Ok(engine) => engine,
            Err(e) => {
                writeln!(self.out, "❌ {}", e)?;
                return Ok(());
            }
        };

        for path in paths {
            let upload = match Upload::read(path) {
                Ok(upload) => upload,
                Err(e) => {
                    writeln!(self.out, "❌ {}", e)?;
                    continue;
                }
            };
            writeln!(self.out, "Analyzing {}...", upload.name)?;
            match engine.recognize(&upload.bytes).await {
                Ok(ocr) => {
                    writeln!(self.out, "Uploaded: {} ({}x{})", upload.name, ocr.width, ocr.height)?;
                    writeln!(self.out, "✅ Text Extracted:")?;
                    self.text_block(&format!("Text from {}", upload.name), &ocr.text)?;
                }
                Err(e) => writeln!(self.out, "❌ {}: {}", upload.name, e)?,
            }
        }
        Ok(())
    }

    /// Extract text from each PDF independently.
    pub async fn analyze_pdfs(&mut self, paths: &[PathBuf]) -> io::Result<()> {
        for path in paths {
            let upload = match Upload::read(path) {
                Ok(upload) => upload,
                Err(e) => {
                    writeln!(self.out, "❌ {}", e)?;
                    continue;
                }
            };
            writeln!(self.out, "Extracting text from {}...", upload.name)?;
            let extracted = extract_pdf_text(&upload.bytes);
            self.show_pdf_text(&upload.name, extracted)?;
        }
        Ok(())
    }

    fn show_pdf_text(
        &mut self,
        name: &str,
        extracted: Result<PdfText, ExtractError>,
    ) -> io::Result<()> {
        let text = match extracted {
            Ok(pdf) => {
                if let Some(page) = pdf.failed_page {
                    writeln!(
                        self.out,
                        "❌ Failed to extract text: page {} could not be read; showing pages before it",
                        page
                    )?;
                }
                pdf.text()
            }
            Err(e) => {
                writeln!(self.out, "❌ Failed to extract text: {}", e)?;
                String::new()
            }
        };
        writeln!(self.out, "✅ Text extracted from {}:", name)?;
        self.text_block(&format!("Text from {}", name), &text)
    }

    /// Load and display a CSV file. `None` if it could not be read.
    pub fn load_csv(&mut self, path: &Path) -> io::Result<Option<Table>> {
        let table = Upload::read(path).and_then(|upload| Table::from_csv_bytes(&upload.bytes));
        match table {
            Ok(table) => {
                writeln!(self.out, "📋 Uploaded CSV Data:")?;
                writeln!(self.out, "{}", table.render())?;
                Ok(Some(table))
            }
            Err(e) => {
                writeln!(self.out, "❌ Error reading CSV file: {}", e)?;
                Ok(None)
            }
        }
    }

    /// Ask a question about the first rows of a table.
    pub async fn ask_about_table(
        &mut self,
        table: &Table,
        question: &str,
    ) -> io::Result<Option<String>> {
        if question.trim().is_empty() {
            return Ok(None);
        }
        let reply = self.ask(&csv_prompt(question, &table.prompt_fragment())).await?;
        writeln!(self.out, "BizBrain AI: {}", reply)?;
        Ok(Some(reply))
    }

    /// Show a CSV file and, if a question is given, answer it.
    pub async fn analyze_csv(&mut self, path: &Path, question: Option<&str>) -> io::Result<()> {
        if let Some(table) = self.load_csv(path)? {
            if let Some(question) = question {
                self.ask_about_table(&table, question).await?;
            }
        }
        Ok(())
    }

    /// Send a prompt; failures print a diagnostic and yield an empty reply.
    async fn ask(&mut self, prompt: &str) -> io::Result<String> {
        let reply = generate_or_empty(&self.generator, prompt).await;
        if let Some(diagnostic) = reply.diagnostic() {
            writeln!(self.out, "{}", diagnostic)?;
        } else {
            match self.copy_mode {
                CopyMode::Off => {}
                CopyMode::Session => self.copy_to_clipboard(&reply.text, false),
                CopyMode::OnFinish => self.pending_copy = Some(reply.text.clone()),
            }
        }
        Ok(reply.text)
    }

    /// Failure is logged, never fatal.
    fn copy_to_clipboard(&mut self, text: &str, hold: bool) {
        if self.clipboard.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.clipboard = Some(clipboard),
                Err(e) => {
                    log::warn!("[SHELL] Clipboard unavailable: {}", e);
                    return;
                }
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match set_clipboard_text(clipboard, text, hold) {
            Ok(()) => log::info!("[SHELL] Copied {} chars to clipboard", text.len()),
            Err(e) => log::warn!("[SHELL] Clipboard copy failed: {}", e),
        }
    }

    fn text_block(&mut self, title: &str, text: &str) -> io::Result<()> {
        writeln!(self.out, "── {} ──", title)?;
        writeln!(self.out, "{}", text)?;
        writeln!(self.out, "──")
    }
}

/// With `hold`, block until another program owns the selection, so the
/// text outlives this process.
#[cfg(target_os = "linux")]
fn set_clipboard_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    hold: bool,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;
    if hold {
        clipboard.set().wait().text(text)
    } else {
        clipboard.set_text(text)
    }
}

#[cfg(not(target_os = "linux"))]
fn set_clipboard_text(
    clipboard: &mut arboard::Clipboard,
    text: &str,
    _hold: bool,
) -> Result<(), arboard::Error> {
    clipboard.set_text(text)
}
