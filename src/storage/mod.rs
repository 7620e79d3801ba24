//! Storage module for deckbot
//!
//! Keeps generated decks in SQLite so later commands can refine them.

mod database;
mod models;

pub use database::Database;
pub use models::StoredDeck;
