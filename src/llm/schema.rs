//! Output schemas for structured calls and parsing of the model's JSON
//!
//! Parsing happens in two steps so that a shape mismatch is reported as a
//! schema error while a heading inside otherwise well-formed content is
//! reported as a slide content violation.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::slides::{Slide, SlideDeck, SlideFields};
use crate::{DeckbotError, Result};

const CONTENT_DESCRIPTION: &str = "Arbitrary markdown or HTML content, without headings";

#[derive(Debug, Deserialize)]
struct DeckFields {
    talk_title: String,
    slides: Vec<SlideFields>,
}

/// JSON Schema for one slide, in the strict subset OpenAI accepts.
pub fn openai_slide_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "title": { "type": "string" },
            "content": { "type": "string", "description": CONTENT_DESCRIPTION },
            "type": { "type": "string", "enum": ["HTML", "Markdown"] }
        },
        "required": ["title", "content", "type"],
        "additionalProperties": false
    })
}

/// JSON Schema for a deck, in the strict subset OpenAI accepts.
pub fn openai_deck_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "talk_title": { "type": "string" },
            "slides": { "type": "array", "items": openai_slide_schema() }
        },
        "required": ["talk_title", "slides"],
        "additionalProperties": false
    })
}

/// Gemini `responseSchema` for one slide.
pub fn gemini_slide_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "content": { "type": "STRING", "description": CONTENT_DESCRIPTION },
            "type": { "type": "STRING", "enum": ["HTML", "Markdown"] }
        },
        "required": ["title", "content", "type"],
        "propertyOrdering": ["title", "content", "type"]
    })
}

/// Gemini `responseSchema` for a deck.
pub fn gemini_deck_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "talk_title": { "type": "STRING" },
            "slides": { "type": "ARRAY", "items": gemini_slide_schema() }
        },
        "required": ["talk_title", "slides"],
        "propertyOrdering": ["talk_title", "slides"]
    })
}

pub fn parse_slide(text: &str) -> Result<Slide> {
    let fields: SlideFields =
        serde_json::from_str(text).map_err(|e| DeckbotError::Schema(e.to_string()))?;
    Ok(Slide::try_from(fields)?)
}

pub fn parse_deck(text: &str) -> Result<SlideDeck> {
    let fields: DeckFields =
        serde_json::from_str(text).map_err(|e| DeckbotError::Schema(e.to_string()))?;

    let slides = fields
        .slides
        .into_iter()
        .map(Slide::try_from)
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(SlideDeck::new(fields.talk_title, slides))
}
