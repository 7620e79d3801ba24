//! In-memory similarity index over rendered slides

use std::collections::HashMap;

use crate::search::Embedder;
use crate::Result;

/// A ranked match: the document's position and its cosine score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub position: usize,
    pub score: f32,
}

/// Holds exactly the documents passed to the last [`rebuild`](Self::rebuild).
///
/// Vectors are cached by document text, so a rebuild only embeds documents
/// that were not present in the previous one.
#[derive(Debug, Default)]
pub struct SimilarityIndex {
    documents: Vec<String>,
    vectors: HashMap<String, Vec<f32>>,
}

impl SimilarityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    /// Replace the indexed documents.
    pub async fn rebuild(&mut self, documents: &[String], embedder: &dyn Embedder) -> Result<()> {
        let mut missing: Vec<String> = Vec::new();
        for doc in documents {
            if !self.vectors.contains_key(doc) && !missing.contains(doc) {
                missing.push(doc.clone());
            }
        }

        if !missing.is_empty() {
            tracing::debug!(
                "Embedding {} of {} documents",
                missing.len(),
                documents.len()
            );
            let vectors = embedder.embed(&missing).await?;
            self.vectors.extend(missing.into_iter().zip(vectors));
        }

        self.vectors.retain(|doc, _| documents.contains(doc));
        self.documents = documents.to_vec();
        Ok(())
    }

    /// Rank every document against `query`, best first; ties keep document order.
    pub async fn rank(&self, query: &str, embedder: &dyn Embedder) -> Result<Vec<Hit>> {
        if self.documents.is_empty() {
            return Ok(Vec::new());
        }

        let query_vector = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .unwrap_or_default();

        let mut hits: Vec<Hit> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, doc)| Hit {
                position,
                score: self
                    .vectors
                    .get(doc)
                    .map(|v| cosine_similarity(&query_vector, v))
                    .unwrap_or(0.0),
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(hits)
    }

    pub async fn best(&self, query: &str, embedder: &dyn Embedder) -> Result<Option<Hit>> {
        Ok(self.rank(query, embedder).await?.into_iter().next())
    }
}

/// Cosine similarity; 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
