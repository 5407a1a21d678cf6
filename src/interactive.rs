//! Interactive session — the single-page flow as a line-oriented menu.
//!
//! Name prompt, then a loop of: pick a tool, pick a sub-mode, give the
//! input, see the result. `q` or end of input leaves. Nothing carries
//! over between rounds except the name.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::llm::prompts::{ContentKind, Personality, Tool, ToolkitFeature};
use crate::llm::Generator;
use crate::shell::{ChatInput, Shell};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMethod {
    Text,
    Voice,
}

impl Display for InputMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            InputMethod::Text => "Text",
            InputMethod::Voice => "Voice (audio file)",
        })
    }
}

/// Run the menu loop until the user quits or input ends.
pub async fn run_session<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
    name: Option<&str>,
) -> io::Result<()> {
    writeln!(shell.output(), "🧠 BizBrain AI")?;
    let name = match name {
        Some(name) => name.to_string(),
        None => match ask(shell, input, "Enter your name: ")? {
            Some(name) => name,
            None => return Ok(()),
        },
    };
    shell.greet(&name)?;

    loop {
        let Some(tool) = choose(shell, input, "Choose a Tool:", &Tool::ALL)? else {
            break;
        };
        log::info!("[SHELL] Tool: {}", tool);
        let keep_going = match tool {
            Tool::StudentToolkit => toolkit_round(shell, input).await?,
            Tool::ContentGenerator => content_round(shell, input).await?,
            Tool::Chatbot => chat_round(shell, input).await?,
        };
        if !keep_going {
            break;
        }
    }
    writeln!(shell.output(), "Goodbye!")?;
    Ok(())
}

async fn toolkit_round<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
) -> io::Result<bool> {
    writeln!(shell.output(), "📚 Student Productivity Toolkit")?;
    let Some(feature) = choose(shell, input, "Choose a feature:", &ToolkitFeature::ALL)? else {
        return Ok(false);
    };
    match feature {
        ToolkitFeature::ImageAnalysis => {
            let Some(paths) = ask_paths(shell, input, "Image file to analyze (png, jpg, jpeg)")? else {
                return Ok(false);
            };
            shell.analyze_images(&paths).await?;
        }
        ToolkitFeature::PdfAnalysis => {
            let Some(paths) = ask_paths(shell, input, "PDF file to analyze")? else {
                return Ok(false);
            };
            shell.analyze_pdfs(&paths).await?;
        }
        ToolkitFeature::CsvAnalysis => {
            let Some(path) = ask(shell, input, "CSV file to analyze: ")? else {
                return Ok(false);
            };
            if let Some(table) = shell.load_csv(Path::new(&path))? {
                let Some(question) = ask(
                    shell,
                    input,
                    "Ask a question about the CSV data (blank to skip): ",
                )?
                else {
                    return Ok(false);
                };
                shell.ask_about_table(&table, &question).await?;
            }
        }
    }
    Ok(true)
}

async fn content_round<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
) -> io::Result<bool> {
    writeln!(shell.output(), "✍️ AI Content Generator")?;
    let Some(kind) = choose(shell, input, "Select content type:", &ContentKind::ALL)? else {
        return Ok(false);
    };
    let Some(topic) = ask(shell, input, "Enter the topic / purpose / keywords: ")? else {
        return Ok(false);
    };
    shell.write_content(kind, &topic).await?;
    Ok(true)
}

async fn chat_round<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
) -> io::Result<bool> {
    let Some(personality) =
        choose(shell, input, "Choose your chatbot personality:", &Personality::ALL)?
    else {
        return Ok(false);
    };
    let methods = [InputMethod::Text, InputMethod::Voice];
    let Some(method) = choose(shell, input, "Choose your input method:", &methods)? else {
        return Ok(false);
    };
    let label = match method {
        InputMethod::Text => "You: ",
        InputMethod::Voice => "Audio file: ",
    };
    let Some(answer) = ask(shell, input, label)? else {
        return Ok(false);
    };
    let chat_input = match method {
        InputMethod::Text => ChatInput::Text(answer),
        InputMethod::Voice if answer.is_empty() => return Ok(true),
        InputMethod::Voice => ChatInput::Voice(PathBuf::from(answer)),
    };
    shell.chat(personality, chat_input).await?;
    Ok(true)
}

/// Print `label` and read one trimmed line. `None` at end of input.
fn ask<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
    label: &str,
) -> io::Result<Option<String>> {
    let out = shell.output();
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// One path per line, whole line taken as-is; a blank line ends the list.
fn ask_paths<G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
    label: &str,
) -> io::Result<Option<Vec<PathBuf>>> {
    let mut paths = Vec::new();
    loop {
        let label = if paths.is_empty() {
            format!("{}: ", label)
        } else {
            "Another file (blank to start): ".to_string()
        };
        match ask(shell, input, &label)? {
            Some(line) if !line.is_empty() => paths.push(PathBuf::from(line)),
            Some(_) => return Ok(Some(paths)),
            None if paths.is_empty() => return Ok(None),
            None => return Ok(Some(paths)),
        }
    }
}

/// Numbered menu. Re-asks on anything that is not a listed number;
/// `q` or end of input yields `None`.
fn choose<T: Copy + Display, G: Generator, W: Write, R: BufRead>(
    shell: &mut Shell<G, W>,
    input: &mut R,
    title: &str,
    options: &[T],
) -> io::Result<Option<T>> {
    loop {
        let out = shell.output();
        writeln!(out, "{}", title)?;
        for (i, option) in options.iter().enumerate() {
            writeln!(out, "  {}) {}", i + 1, option)?;
        }
        writeln!(out, "  q) Quit")?;
        let Some(answer) = ask(shell, input, "> ")? else {
            return Ok(None);
        };
        if answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=options.len()).contains(&n) => return Ok(Some(options[n - 1])),
            _ => writeln!(shell.output(), "Please pick 1-{} or q.", options.len())?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OcrSettings;
    use crate::shell::testing::Recording;
    use std::io::Cursor;

    fn shell() -> Shell<Recording, Vec<u8>> {
        Shell::new(
            Recording::answering("Sure thing."),
            Vec::new(),
            OcrSettings { binary: None, language: "eng".into() },
        )
    }

    #[tokio::test]
    async fn formal_email_round() {
        let mut sh = shell();
        let mut input = Cursor::new("Ada\n2\n2\nrequest a refund\nq\n");
        run_session(&mut sh, &mut input, None).await.unwrap();

        assert_eq!(
            sh.generator().prompts(),
            vec!["Compose a professional email about: request a refund".to_string()]
        );
        let out = String::from_utf8(sh.into_output()).unwrap();
        assert!(out.contains("Hi Ada! 👋"));
        assert!(out.contains("📝 Generated Output\nSure thing."));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn chat_round_with_reprompt() {
        let mut sh = shell();
        let mut input = Cursor::new("3\n9\n3\n1\ntell me a joke\n");
        run_session(&mut sh, &mut input, Some("Bo")).await.unwrap();

        assert_eq!(
            sh.generator().prompts(),
            vec!["Add a touch of humor and act like a fun chatbot. User asked: tell me a joke".to_string()]
        );
        let out = String::from_utf8(sh.into_output()).unwrap();
        assert!(out.contains("Please pick 1-3 or q."));
        assert!(out.contains("BizBrain AI: Sure thing."));
    }

    #[tokio::test]
    async fn csv_round_asks_about_loaded_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grades.csv");
        std::fs::write(&path, "student,score\nAda,91\nBo,78\n").unwrap();

        let mut sh = shell();
        let script = format!("1\n3\n{}\nwho scored highest?\nq\n", path.display());
        let mut input = Cursor::new(script);
        run_session(&mut sh, &mut input, Some("Cy")).await.unwrap();

        let prompts = sh.generator().prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("who scored highest?"));
        assert!(prompts[0].contains("Ada"));
    }

    #[tokio::test]
    async fn pdf_paths_may_contain_spaces() {
        use crate::extract::pdf::fixtures::pdf_with_pages;

        let dir = tempfile::tempdir().unwrap();
        let spaced = dir.path().join("Lecture Notes.pdf");
        let plain = dir.path().join("syllabus.pdf");
        std::fs::write(&spaced, pdf_with_pages(&["Hello"])).unwrap();
        std::fs::write(&plain, pdf_with_pages(&["Week one"])).unwrap();

        let mut sh = shell();
        let script = format!("1\n2\n{}\n{}\n\nq\n", spaced.display(), plain.display());
        run_session(&mut sh, &mut Cursor::new(script), Some("Di")).await.unwrap();

        let out = String::from_utf8(sh.into_output()).unwrap();
        assert!(!out.contains("could not read"), "{}", out);
        assert!(out.contains("✅ Text extracted from Lecture Notes.pdf:"));
        assert!(out.contains("Hello"));
        assert!(out.contains("✅ Text extracted from syllabus.pdf:"));
        assert!(out.contains("Week one"));
        assert!(out.ends_with("Goodbye!\n"));
    }

    #[tokio::test]
    async fn end_of_input_at_name_ends_quietly() {
        let mut sh = shell();
        run_session(&mut sh, &mut Cursor::new(""), None).await.unwrap();
        assert!(sh.generator().prompts().is_empty());
    }
}
