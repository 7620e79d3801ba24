//! Slide and deck data model
//!
//! Slides are validated when they are built, whichever way they are built:
//! through [`Slide::new`] or by deserializing model output or stored JSON.

mod deck;
mod slide;

pub use deck::SlideDeck;
pub use slide::{Slide, SlideError, SlideFields, SlideKind};
