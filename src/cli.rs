//! Command-line surface.
//!
//! Every feature is reachable as a one-shot subcommand; with no
//! subcommand the interactive session starts instead.

use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::interactive;
use crate::llm::prompts::{ContentKind, Personality};
use crate::llm::Generator;
use crate::shell::{ChatInput, Shell};

#[derive(Debug, Parser)]
#[command(name = "bizbrain", version, about = "🧠 BizBrain AI — chat, writing, and document text extraction")]
pub struct Cli {
    /// Your name, used to greet you
    #[arg(long, global = true)]
    pub name: Option<String>,

    /// Gemini model to use (default: GEMINI_MODEL or gemini-1.5-pro-latest)
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Copy generated replies to the clipboard. On Linux a one-shot
    /// command keeps running until another program takes the clipboard
    #[arg(long, global = true)]
    pub copy: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Talk to a chatbot personality
    Chat {
        #[arg(short, long, value_enum, default_value_t = Personality::Friendly)]
        personality: Personality,

        /// Recorded audio to use instead of typed text (wav, mp3, flac, ogg, aiff, aac)
        #[arg(long, conflicts_with = "message")]
        voice: Option<PathBuf>,

        /// What to say
        message: Vec<String>,
    },

    /// Generate a letter, email, story, blog post, or social media post
    Write {
        #[arg(short, long, value_enum)]
        kind: ContentKind,

        /// Topic, purpose, or keywords
        #[arg(required = true)]
        topic: Vec<String>,
    },

    /// Extract text from images with OCR
    Image {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Extract text from PDF documents
    Pdf {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show a CSV file and optionally ask a question about it
    Csv {
        file: PathBuf,

        /// Question about the data (the first 10 rows are sent)
        #[arg(short, long)]
        ask: Option<String>,
    },

    /// Manage the Gemini API key in the OS keychain
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Store an API key
    Set { key: String },
    /// Remove the stored API key
    Clear,
    /// Send a minimal request to check the key works
    Test,
}

/// Run a feature command (or the interactive session) against a shell.
///
/// `Key` commands are handled before a shell exists and are ignored here.
pub async fn dispatch<G: Generator, W: Write, R: BufRead>(
    command: Option<Command>,
    name: Option<&str>,
    shell: &mut Shell<G, W>,
    input: &mut R,
) -> std::io::Result<()> {
    if command.is_some() {
        if let Some(name) = name {
            shell.greet(name)?;
        }
    }
    match command {
        None => interactive::run_session(shell, input, name).await,
        Some(Command::Chat {
            personality,
            voice,
            message,
        }) => {
            let input = match voice {
                Some(path) => ChatInput::Voice(path),
                None => ChatInput::Text(message.join(" ")),
            };
            shell.chat(personality, input).await.map(|_| ())
        }
        Some(Command::Write { kind, topic }) => {
            shell.write_content(kind, &topic.join(" ")).await.map(|_| ())
        }
        Some(Command::Image { files }) => shell.analyze_images(&files).await,
        Some(Command::Pdf { files }) => shell.analyze_pdfs(&files).await,
        Some(Command::Csv { file, ask }) => shell.analyze_csv(&file, ask.as_deref()).await,
        Some(Command::Key { .. }) => Ok(()),
    }
}
