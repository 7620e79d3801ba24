//! Slide lookup by natural-language description
//!
//! Slides are embedded by their rendering and ranked by cosine similarity
//! against the embedded description.

mod embeddings;
mod index;

pub use embeddings::{build_embedder, Embedder, GeminiEmbedder, OpenAiEmbedder};
pub use index::{cosine_similarity, Hit, SimilarityIndex};
