/// System prompt for single-slide generation.
pub const SLIDE_SYSTEM_PROMPT: &str = "You are an expert at making markdown slides.\n\
\n\
Your job is to produce a single slide that represents the content the user asks for.\n\
Tables should be in HTML.\n\
Never put headings in the slide content; the title is rendered as the heading.";

/// System prompt for whole-deck generation.
pub const DECK_SYSTEM_PROMPT: &str = "You are a bot that helps people make slides for a presentation.\n\
Vary the style of slides when you generate them; do not stick to only bullet points.\n\
Quotes should be formatted as such.\n\
Never put headings in slide content; each slide title is rendered as its heading.";

/// Build the request for regenerating an existing slide.
pub fn build_edit_prompt(change: &str, existing_slide: &str) -> String {
    format!(
        "This is the request for an edit on a slide.\n\
\n\
{change}\n\
\n\
The existing content is here:\n\
\n\
{existing_slide}\n\
\n\
Help me create a new slide based on the new request, \
using the existing slide as inspiration or basis where appropriate."
    )
}

/// Build the request for a new slide that fits into an existing deck.
pub fn build_insert_prompt(description: &str, existing_slides: &str) -> String {
    format!(
        "This is the request to insert a slide.\n\
\n\
{description}\n\
\n\
---\n\
\n\
Here is the current state of the slides:\n\
\n\
{existing_slides}\n\
\n\
---\n\
\n\
Help me create a new slide based on the new request, \
weaving it seamlessly with the slide before and after."
    )
}
