//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slides::SlideDeck;

/// A generated deck kept in the library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDeck {
    /// Unique identifier (UUID)
    pub id: String,

    /// The deck itself
    pub deck: SlideDeck,

    /// Request the deck was generated from
    pub prompt: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl StoredDeck {
    /// Wrap a freshly generated deck
    pub fn new(deck: SlideDeck, prompt: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            deck,
            prompt,
            created_at: now,
            updated_at: now,
        }
    }

    /// First eight characters of the id, as shown in listings
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }

    /// Mark the deck as modified now
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
