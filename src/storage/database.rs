//! SQLite deck library

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::config::Settings;
use crate::slides::{Slide, SlideDeck, SlideKind};
use crate::storage::models::StoredDeck;

/// Database wrapper for deckbot
pub struct Database {
    conn: Connection,
}

const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Deck row before its slides are attached
struct DeckRow {
    id: String,
    talk_title: String,
    prompt: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl Database {
    /// Open or create the database
    pub fn open(settings: &Settings) -> Result<Self> {
        let db_path = settings.database_path();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        Self::open_path(&db_path)
    }

    /// Open database at a specific path (useful for testing)
    pub fn open_path(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        let db = Self { conn };
        db.initialize()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize database schema
    fn initialize(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let current_version = self.schema_version()?;
        if current_version > CURRENT_SCHEMA_VERSION {
            anyhow::bail!(
                "Database schema version {} is newer than supported version {}",
                current_version,
                CURRENT_SCHEMA_VERSION
            );
        }

        if current_version < 1 {
            self.migrate_to_v1()?;
            self.set_schema_version(1)?;
        }

        Ok(())
    }

    /// Current schema version tracked in PRAGMA user_version.
    pub fn schema_version(&self) -> Result<i64> {
        Ok(self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?)
    }

    fn set_schema_version(&self, version: i64) -> Result<()> {
        self.conn
            .execute_batch(&format!("PRAGMA user_version = {};", version))?;
        Ok(())
    }

    fn migrate_to_v1(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS decks (
                id TEXT PRIMARY KEY,
                talk_title TEXT NOT NULL,
                prompt TEXT,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_decks_created_at
                ON decks(created_at DESC);

            CREATE TABLE IF NOT EXISTS slides (
                deck_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                kind TEXT NOT NULL,
                PRIMARY KEY (deck_id, position),
                FOREIGN KEY (deck_id) REFERENCES decks(id) ON DELETE CASCADE
            );
            "#,
        )?;

        Ok(())
    }

    /// Insert a new deck with its slides
    pub fn insert_deck(&mut self, stored: &StoredDeck) -> Result<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT INTO decks (id, talk_title, prompt, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                stored.id,
                stored.deck.talk_title,
                stored.prompt,
                stored.created_at.timestamp(),
                stored.updated_at.timestamp(),
            ],
        )?;
        insert_slides(&tx, &stored.id, &stored.deck.slides)?;

        tx.commit()?;
        Ok(())
    }

    /// Update a deck, replacing all of its slides
    pub fn update_deck(&mut self, stored: &StoredDeck) -> Result<()> {
        let tx = self.conn.transaction()?;

        let changed = tx.execute(
            r#"
            UPDATE decks
            SET talk_title = ?2, prompt = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
            params![
                stored.id,
                stored.deck.talk_title,
                stored.prompt,
                stored.updated_at.timestamp(),
            ],
        )?;
        if changed == 0 {
            anyhow::bail!("Deck not found: {}", stored.id);
        }

        tx.execute("DELETE FROM slides WHERE deck_id = ?1", params![stored.id])?;
        insert_slides(&tx, &stored.id, &stored.deck.slides)?;

        tx.commit()?;
        Ok(())
    }

    /// Get a deck by ID
    pub fn get_deck(&self, id: &str) -> Result<Option<StoredDeck>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, talk_title, prompt, created_at, updated_at FROM decks WHERE id = ?1",
                params![id],
                deck_row,
            )
            .optional()?;

        row.map(|row| self.attach_slides(row)).transpose()
    }

    /// Find a deck by ID prefix; ambiguous prefixes are an error
    pub fn find_deck_by_prefix(&self, prefix: &str) -> Result<Option<StoredDeck>> {
        if prefix.is_empty() {
            anyhow::bail!("Deck id prefix must not be empty");
        }

        let mut stmt = self.conn.prepare(
            "SELECT id, talk_title, prompt, created_at, updated_at FROM decks \
             WHERE id LIKE ?1 || '%' ESCAPE '\\' ORDER BY created_at DESC LIMIT 2",
        )?;

        let rows = stmt
            .query_map(params![escape_like(prefix)], deck_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        if rows.len() > 1 {
            anyhow::bail!("Deck id prefix '{}' is ambiguous", prefix);
        }

        rows.into_iter()
            .next()
            .map(|row| self.attach_slides(row))
            .transpose()
    }

    /// List decks, newest first
    pub fn list_decks(&self, limit: usize) -> Result<Vec<StoredDeck>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, talk_title, prompt, created_at, updated_at FROM decks \
             ORDER BY created_at DESC LIMIT ?1",
        )?;

        let rows = stmt
            .query_map(params![limit as i64], deck_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(|row| self.attach_slides(row)).collect()
    }

    /// Search decks by talk title or slide text (case-insensitive)
    pub fn search_decks(&self, query: &str, limit: usize) -> Result<Vec<StoredDeck>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT d.id, d.talk_title, d.prompt, d.created_at, d.updated_at
            FROM decks d
            WHERE d.talk_title LIKE '%' || ?1 || '%' ESCAPE '\'
               OR EXISTS (
                   SELECT 1 FROM slides s
                   WHERE s.deck_id = d.id
                     AND (s.title LIKE '%' || ?1 || '%' ESCAPE '\'
                          OR s.content LIKE '%' || ?1 || '%' ESCAPE '\')
               )
            ORDER BY d.created_at DESC
            LIMIT ?2
            "#,
        )?;

        let rows = stmt
            .query_map(params![escape_like(query), limit as i64], deck_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(|row| self.attach_slides(row)).collect()
    }

    /// Delete a deck and its slides
    pub fn delete_deck(&self, id: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM decks WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn attach_slides(&self, row: DeckRow) -> Result<StoredDeck> {
        let mut stmt = self.conn.prepare(
            "SELECT title, content, kind FROM slides WHERE deck_id = ?1 ORDER BY position ASC",
        )?;

        let fields = stmt
            .query_map(params![row.id], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let slides = fields
            .into_iter()
            .map(|(title, content, kind)| {
                let kind = SlideKind::from_name(&kind)
                    .with_context(|| format!("Unknown slide kind '{}' in deck {}", kind, row.id))?;
                Slide::new(title, content, kind)
                    .with_context(|| format!("Stored slide in deck {} is invalid", row.id))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(StoredDeck {
            id: row.id,
            deck: SlideDeck::new(row.talk_title, slides),
            prompt: row.prompt,
            created_at: Utc
                .timestamp_opt(row.created_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
            updated_at: Utc
                .timestamp_opt(row.updated_at, 0)
                .single()
                .unwrap_or_else(Utc::now),
        })
    }
}

fn deck_row(row: &Row<'_>) -> rusqlite::Result<DeckRow> {
    Ok(DeckRow {
        id: row.get(0)?,
        talk_title: row.get(1)?,
        prompt: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

/// Escape `\`, `%` and `_` so user text matches literally in `LIKE ... ESCAPE '\'`
fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn insert_slides(conn: &Connection, deck_id: &str, slides: &[Slide]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO slides (deck_id, position, title, content, kind) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;

    for (position, slide) in slides.iter().enumerate() {
        stmt.execute(params![
            deck_id,
            position as i64,
            slide.title(),
            slide.content(),
            slide.kind().as_str(),
        ])?;
    }

    Ok(())
}
