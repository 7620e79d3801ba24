//! A single slide and its content rules

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content format of a slide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideKind {
    Markdown,
    #[serde(rename = "HTML")]
    Html,
}

impl SlideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "Markdown" => Some(Self::Markdown),
            "HTML" => Some(Self::Html),
            _ => None,
        }
    }
}

/// Content formatting violations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlideError {
    #[error("headers are not allowed in slide content (line {line}); use regular text formatting instead")]
    MarkdownHeader { line: usize },

    #[error("HTML header tag {tag} is not allowed in slide content")]
    HtmlHeader { tag: &'static str },
}

const HTML_HEADER_TAGS: [&str; 6] = ["<h1", "<h2", "<h3", "<h4", "<h5", "<h6"];

/// One titled unit of presentation content
///
/// The title is rendered as a level-2 heading, so the content itself may
/// not carry any heading markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SlideFields")]
pub struct Slide {
    title: String,
    content: String,
    #[serde(rename = "type")]
    kind: SlideKind,
}

/// Unvalidated slide shape, as produced by a model or read from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SlideFields {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: SlideKind,
}

impl TryFrom<SlideFields> for Slide {
    type Error = SlideError;

    fn try_from(fields: SlideFields) -> Result<Self, Self::Error> {
        Slide::new(fields.title, fields.content, fields.kind)
    }
}

impl Slide {
    /// Build a slide, rejecting content that contains header markup
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        kind: SlideKind,
    ) -> Result<Self, SlideError> {
        let content = content.into();

        match kind {
            SlideKind::Markdown => {
                if let Some(line) = find_markdown_header(&content) {
                    return Err(SlideError::MarkdownHeader { line });
                }
            }
            SlideKind::Html => {
                if let Some(tag) = find_html_header(&content) {
                    return Err(SlideError::HtmlHeader { tag });
                }
            }
        }

        Ok(Self {
            title: title.into(),
            content,
            kind,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> SlideKind {
        self.kind
    }

    /// Render the slide as markdown: the title as a level-2 heading, then the content
    pub fn render(&self) -> String {
        format!("## {}\n\n{}\n", self.title, self.content)
    }
}

/// Returns the 1-based line number of the first line that opens with
/// 1-6 `#` followed by whitespace. A run of `#` that ends the line counts
/// when a newline follows it.
fn find_markdown_header(content: &str) -> Option<usize> {
    let lines: Vec<&str> = content.split('\n').collect();
    let last = lines.len() - 1;

    lines.iter().enumerate().find_map(|(i, line)| {
        let hashes = line.bytes().take_while(|&b| b == b'#').count();
        if !(1..=6).contains(&hashes) {
            return None;
        }

        let opens_header = match line[hashes..].chars().next() {
            Some(c) => c.is_whitespace(),
            None => i < last,
        };
        opens_header.then_some(i + 1)
    })
}

fn find_html_header(content: &str) -> Option<&'static str> {
    let lowered = content.to_lowercase();
    HTML_HEADER_TAGS
        .iter()
        .copied()
        .find(|tag| lowered.contains(tag))
}
