//! BizBrain — library behind the `bizbrain` binary.
//!
//! This is the app shell that wires together all domains. No business
//! logic lives here — only module declarations, startup, and the key
//! management commands.
//!
//! Features are split across:
//!   - llm/         — prompt templates + Gemini client
//!   - extract/     — OCR, PDF, and CSV adapters
//!   - speech.rs    — audio file → chat transcript
//!   - shell.rs     — feature handlers that render to the terminal
//!   - cli.rs       — clap commands; interactive.rs — menu session

pub mod cli;
pub mod config;
pub mod extract;
pub mod interactive;
pub mod llm;
pub mod shell;
pub mod speech;

use std::io;
use std::path::Path;
use thiserror::Error;

use cli::{Cli, Command, KeyAction};
use config::{AppConfig, ConfigError};
use llm::{GeminiClient, LlmError};
use shell::{CopyMode, Shell};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Entry point — called by `main` with parsed arguments.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    config::load_env_files(Path::new("."));

    // Quiet by default so logs do not interleave with answers.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    log::info!("BizBrain starting up");

    if let Some(Command::Key { action }) = &cli.command {
        return run_key_command(action, cli.model.as_deref()).await;
    }

    let config = AppConfig::from_env(cli.model.as_deref());
    let client = GeminiClient::new(config.gemini);
    let copy_mode = CopyMode::for_invocation(cli.copy, cli.command.is_some());
    let mut shell = Shell::new(client, io::stdout(), config.ocr).copy_replies(copy_mode);
    let mut input = io::stdin().lock();

    cli::dispatch(cli.command, cli.name.as_deref(), &mut shell, &mut input).await?;
    shell.finish()?;
    Ok(())
}

async fn run_key_command(action: &KeyAction, model: Option<&str>) -> Result<(), AppError> {
    match action {
        KeyAction::Set { key } => {
            config::save_api_key(key)?;
            println!("✅ API key saved to the OS keychain");
        }
        KeyAction::Clear => {
            config::clear_api_key()?;
            println!("✅ API key removed from the OS keychain");
        }
        KeyAction::Test => {
            let config = AppConfig::from_env(model);
            let client = GeminiClient::new(config.gemini);
            client.check_connection().await?;
            println!("✅ Gemini answered (model: {})", client.model());
        }
    }
    Ok(())
}
