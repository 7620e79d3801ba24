//! Slide deck aggregate

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::llm::prompts::{build_edit_prompt, build_insert_prompt};
use crate::llm::SlideGenerator;
use crate::search::{Embedder, SimilarityIndex};
use crate::slides::Slide;
use crate::{DeckbotError, Result};

/// An ordered collection of slides plus the talk title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideDeck {
    pub talk_title: String,
    pub slides: Vec<Slide>,
}

impl SlideDeck {
    pub fn new(talk_title: impl Into<String>, slides: Vec<Slide>) -> Self {
        Self {
            talk_title: talk_title.into(),
            slides,
        }
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Render all slides as markdown with `---` separators between them
    pub fn render(&self) -> String {
        let last = self.slides.len().saturating_sub(1);
        let mut parts = Vec::with_capacity(self.slides.len() * 3);

        for (i, slide) in self.slides.iter().enumerate() {
            parts.push(format!("## {}\n\n{}", slide.title(), slide.content()));
            parts.push(format!("\nSlide {}", i));

            if i < last {
                parts.push("---".to_string());
            }
        }

        parts.join("\n\n")
    }

    /// Write the rendered deck to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.render())?;
        tracing::info!("Slide deck saved to {}", path.display());
        Ok(())
    }

    /// Replace the slide at `index` with a regenerated one.
    ///
    /// The model sees the old slide's rendering alongside the requested
    /// change. The deck is left untouched if generation fails.
    pub async fn edit(
        &mut self,
        index: usize,
        change: &str,
        generator: &dyn SlideGenerator,
    ) -> Result<()> {
        let current = self.slides.get(index).ok_or(DeckbotError::IndexOutOfRange {
            index,
            len: self.slides.len(),
        })?;

        let prompt = build_edit_prompt(change, &current.render());
        let slide = generator.generate_slide(&prompt).await?;

        tracing::debug!("Replacing slide {} with '{}'", index, slide.title());
        self.slides[index] = slide;
        Ok(())
    }

    /// Generate a slide with the whole deck as context and insert it before `index`.
    ///
    /// `index == len()` appends.
    pub async fn insert(
        &mut self,
        index: usize,
        description: &str,
        generator: &dyn SlideGenerator,
    ) -> Result<()> {
        if index > self.slides.len() {
            return Err(DeckbotError::IndexOutOfRange {
                index,
                len: self.slides.len(),
            });
        }

        let prompt = build_insert_prompt(description, &self.render());
        let slide = generator.generate_slide(&prompt).await?;

        tracing::debug!("Inserting '{}' at position {}", slide.title(), index);
        self.slides.insert(index, slide);
        Ok(())
    }

    /// Find the slide that best matches a natural-language description.
    ///
    /// Builds a fresh similarity index over the current renderings on every call.
    pub async fn select(&self, description: &str, embedder: &dyn Embedder) -> Result<usize> {
        let mut index = SimilarityIndex::new();
        self.select_with(description, &mut index, embedder).await
    }

    /// Like [`select`](Self::select), but reuses embeddings cached in `index`
    /// for slides whose rendering has not changed.
    pub async fn select_with(
        &self,
        description: &str,
        index: &mut SimilarityIndex,
        embedder: &dyn Embedder,
    ) -> Result<usize> {
        if self.slides.is_empty() {
            return Err(DeckbotError::EmptyDeck);
        }

        let renderings: Vec<String> = self.slides.iter().map(Slide::render).collect();
        index.rebuild(&renderings, embedder).await?;

        let hit = index
            .best(description, embedder)
            .await?
            .ok_or(DeckbotError::EmptyDeck)?;

        // Identical renderings resolve to the last slide carrying them.
        let best = &renderings[hit.position];
        let position = renderings
            .iter()
            .rposition(|rendering| rendering == best)
            .unwrap_or(hit.position);

        tracing::debug!("Selected slide {} (score {:.3})", position, hit.score);
        Ok(position)
    }
}
