//! Prompt templates — the fixed instruction attached to each sub-mode.
//!
//! These strings are the whole "personality" of the assistant. The raw
//! user text is appended verbatim after the instruction, never rewritten.

use clap::ValueEnum;
use std::fmt;

/// Top-level feature selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    StudentToolkit,
    ContentGenerator,
    Chatbot,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::StudentToolkit, Tool::ContentGenerator, Tool::Chatbot];

    pub fn label(self) -> &'static str {
        match self {
            Tool::StudentToolkit => "Student Productivity Toolkit",
            Tool::ContentGenerator => "AI Content Generator",
            Tool::Chatbot => "BizBrain AI Chatbot",
        }
    }
}

/// Chatbot personality.
///
/// `Plain` is the pass-through used when no known personality applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Personality {
    Friendly,
    Professional,
    Funny,
    Plain,
}

impl Personality {
    pub const ALL: [Personality; 3] = [
        Personality::Friendly,
        Personality::Professional,
        Personality::Funny,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Personality::Friendly => "Friendly Bot",
            Personality::Professional => "Professional Bot",
            Personality::Funny => "Funny Bot",
            Personality::Plain => "Plain",
        }
    }

    /// Parse a display label; anything unrecognized becomes `Plain`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(Personality::Plain)
    }

    fn instruction(self) -> Option<&'static str> {
        match self {
            Personality::Friendly => {
                Some("Act like a friendly assistant and respond warmly to: ")
            }
            Personality::Professional => {
                Some("Act like a professional business assistant and answer formally: ")
            }
            Personality::Funny => {
                Some("Add a touch of humor and act like a fun chatbot. User asked: ")
            }
            Personality::Plain => None,
        }
    }
}

/// Kind of document the content generator writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ContentKind {
    #[value(name = "letter")]
    FormalLetter,
    #[value(name = "email")]
    FormalEmail,
    Story,
    Blog,
    #[value(name = "social")]
    SocialPost,
    Plain,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::FormalLetter,
        ContentKind::FormalEmail,
        ContentKind::Story,
        ContentKind::Blog,
        ContentKind::SocialPost,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::FormalLetter => "Formal Letter",
            ContentKind::FormalEmail => "Formal Email",
            ContentKind::Story => "Story Creation",
            ContentKind::Blog => "Blog Writing",
            ContentKind::SocialPost => "Social Media Post",
            ContentKind::Plain => "Plain",
        }
    }

    /// Parse a display label; anything unrecognized becomes `Plain`.
    pub fn from_label(label: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(label.trim()))
            .unwrap_or(ContentKind::Plain)
    }

    fn instruction(self) -> Option<&'static str> {
        match self {
            ContentKind::FormalLetter => Some("Write a formal letter regarding: "),
            ContentKind::FormalEmail => Some("Compose a professional email about: "),
            ContentKind::Story => Some("Create a short and engaging story based on: "),
            ContentKind::Blog => {
                Some("Write an informative and well-structured blog post on: ")
            }
            ContentKind::SocialPost => {
                Some("Generate a catchy and engaging social media post about: ")
            }
            ContentKind::Plain => None,
        }
    }
}

/// Student toolkit feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolkitFeature {
    ImageAnalysis,
    PdfAnalysis,
    CsvAnalysis,
}

impl ToolkitFeature {
    pub const ALL: [ToolkitFeature; 3] = [
        ToolkitFeature::ImageAnalysis,
        ToolkitFeature::PdfAnalysis,
        ToolkitFeature::CsvAnalysis,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ToolkitFeature::ImageAnalysis => "Image Analysis",
            ToolkitFeature::PdfAnalysis => "PDF Analysis",
            ToolkitFeature::CsvAnalysis => "CSV Data Analysis",
        }
    }
}

macro_rules! display_via_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_via_label!(Tool, Personality, ContentKind, ToolkitFeature);

/// Instruction sent alongside an audio clip to get a transcript back.
pub const TRANSCRIBE_PROMPT: &str = "Transcribe the speech in this audio verbatim. \
Reply with the transcript only. If no intelligible speech is present, reply with nothing.";

/// Prompt used to check that a key and model actually answer.
pub const PING_PROMPT: &str = "Reply with just: ok";

fn prefixed(instruction: Option<&str>, text: &str) -> String {
    match instruction {
        Some(prefix) => format!("{prefix}{text}"),
        None => text.to_string(),
    }
}

/// Build the chatbot prompt for a personality.
pub fn chat_prompt(personality: Personality, text: &str) -> String {
    prefixed(personality.instruction(), text)
}

/// Build the content-generator prompt for a document kind.
pub fn content_prompt(kind: ContentKind, text: &str) -> String {
    prefixed(kind.instruction(), text)
}

/// Build the CSV question prompt from the question and a rendered table fragment.
pub fn csv_prompt(question: &str, table_fragment: &str) -> String {
    format!("Analyze the following data and answer the question: {question}\n\n{table_fragment}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_prefixes_instruction_verbatim() {
        let text = "what's the weather like?";
        for p in Personality::ALL {
            let prompt = chat_prompt(p, text);
            let instruction = p.instruction().unwrap();
            assert!(prompt.starts_with(instruction), "{p}: {prompt}");
            assert_eq!(&prompt[instruction.len()..], text);
        }
    }

    #[test]
    fn chat_known_prompts() {
        assert_eq!(
            chat_prompt(Personality::Friendly, "hi"),
            "Act like a friendly assistant and respond warmly to: hi"
        );
        assert_eq!(
            chat_prompt(Personality::Professional, "hi"),
            "Act like a professional business assistant and answer formally: hi"
        );
        assert_eq!(
            chat_prompt(Personality::Funny, "hi"),
            "Add a touch of humor and act like a fun chatbot. User asked: hi"
        );
    }

    #[test]
    fn content_contains_input() {
        let topic = "quarterly results, with  odd   spacing\nand a newline";
        for k in ContentKind::ALL {
            assert!(content_prompt(k, topic).contains(topic), "{k}");
        }
    }

    #[test]
    fn formal_email_scenario() {
        assert_eq!(
            content_prompt(ContentKind::FormalEmail, "request a refund"),
            "Compose a professional email about: request a refund"
        );
    }

    #[test]
    fn unknown_labels_pass_text_through() {
        assert_eq!(Personality::from_label("Grumpy Bot"), Personality::Plain);
        assert_eq!(ContentKind::from_label("Haiku"), ContentKind::Plain);
        assert_eq!(chat_prompt(Personality::Plain, "raw"), "raw");
        assert_eq!(content_prompt(ContentKind::Plain, "raw"), "raw");
    }

    #[test]
    fn labels_round_trip() {
        assert_eq!(Personality::from_label("funny bot"), Personality::Funny);
        assert_eq!(ContentKind::from_label(" Blog Writing "), ContentKind::Blog);
    }

    #[test]
    fn csv_prompt_layout() {
        assert_eq!(
            csv_prompt("which is largest?", "   a\n0  1"),
            "Analyze the following data and answer the question: which is largest?\n\n   a\n0  1"
        );
    }
}
