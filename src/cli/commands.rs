//! CLI command implementations

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::audio::MicrophoneRecorder;
use crate::cli::args::{ConfigCommand, SlideTarget};
use crate::config::Settings;
use crate::llm::build_generator;
use crate::search::build_embedder;
use crate::slides::SlideDeck;
use crate::storage::{Database, StoredDeck};
use crate::transcription::WhisperTranscriber;

/// Generate a new deck and store it
pub async fn new_deck(settings: &Settings, prompt: &str, output: Option<PathBuf>) -> Result<()> {
    let generator = build_generator(settings)?;
    let deck = generator.generate_deck(prompt).await?;
    let stored = store_new_deck(settings, deck, prompt)?;

    if let Some(path) = output {
        stored.deck.save(&path)?;
        eprintln!("Saved to {}", path.display());
    }

    Ok(())
}

/// Generate a single slide and print it
pub async fn new_slide(settings: &Settings, prompt: &str) -> Result<()> {
    let generator = build_generator(settings)?;
    let slide = generator.generate_slide(prompt).await?;
    print!("{}", slide.render());
    Ok(())
}

/// List stored decks
pub async fn list_decks(settings: &Settings, limit: usize, search: Option<String>) -> Result<()> {
    let db = Database::open(settings)?;

    let decks = if let Some(query) = search {
        db.search_decks(&query, limit)?
    } else {
        db.list_decks(limit)?
    };

    if decks.is_empty() {
        println!("No decks found");
        return Ok(());
    }

    println!("{:<10} {:<40} {:<12} {:>6}", "ID", "Title", "Date", "Slides");
    println!("{}", "-".repeat(71));

    for stored in decks {
        println!(
            "{:<10} {:<40} {:<12} {:>6}",
            stored.short_id(),
            truncate(&stored.deck.talk_title, 38),
            stored.created_at.format("%Y-%m-%d"),
            stored.deck.len()
        );
    }

    Ok(())
}

/// Print a stored deck
pub async fn show_deck(settings: &Settings, id: &str) -> Result<()> {
    let db = Database::open(settings)?;
    let stored = find_deck(&db, id)?;

    println!("# {}", stored.deck.talk_title);
    println!();
    println!("{}", stored.deck.render());
    Ok(())
}

/// Regenerate one slide of a stored deck
pub async fn edit_slide(
    settings: &Settings,
    id: &str,
    target: SlideTarget,
    change: &str,
) -> Result<()> {
    let mut db = Database::open(settings)?;
    let mut stored = find_deck(&db, id)?;

    let index = match (target.index, target.select) {
        (Some(index), _) => index,
        (None, Some(description)) => {
            let embedder = build_embedder(settings)?;
            let index = stored.deck.select(&description, embedder.as_ref()).await?;
            eprintln!("Selected slide {}: {}", index, stored.deck.slides[index].title());
            index
        }
        (None, None) => anyhow::bail!("Either --index or --select is required"),
    };

    let generator = build_generator(settings)?;
    stored.deck.edit(index, change, generator.as_ref()).await?;
    stored.touch();
    db.update_deck(&stored)?;

    println!("Updated slide {} of {}:", index, stored.short_id());
    println!();
    print!("{}", stored.deck.slides[index].render());
    Ok(())
}

/// Insert a generated slide into a stored deck
pub async fn insert_slide(
    settings: &Settings,
    id: &str,
    index: usize,
    description: &str,
) -> Result<()> {
    let mut db = Database::open(settings)?;
    let mut stored = find_deck(&db, id)?;

    let generator = build_generator(settings)?;
    stored
        .deck
        .insert(index, description, generator.as_ref())
        .await?;
    stored.touch();
    db.update_deck(&stored)?;

    println!(
        "Inserted slide {} into {} ({} slides):",
        index,
        stored.short_id(),
        stored.deck.len()
    );
    println!();
    print!("{}", stored.deck.slides[index].render());
    Ok(())
}

/// Print the index of the slide that best matches a description
pub async fn select_slide(settings: &Settings, id: &str, description: &str) -> Result<()> {
    let db = Database::open(settings)?;
    let stored = find_deck(&db, id)?;

    let embedder = build_embedder(settings)?;
    let index = stored.deck.select(description, embedder.as_ref()).await?;

    println!("{}", index);
    eprintln!("{}", stored.deck.slides[index].title());
    Ok(())
}

/// Write a stored deck as markdown
pub async fn save_deck(settings: &Settings, id: &str, path: Option<PathBuf>) -> Result<()> {
    let db = Database::open(settings)?;
    let stored = find_deck(&db, id)?;

    let path = path.unwrap_or_else(|| default_output_path(settings, &stored.deck));
    stored
        .deck
        .save(&path)
        .with_context(|| format!("Failed to save deck to {}", path.display()))?;

    println!("Slide deck saved to {}", path.display());
    Ok(())
}

/// Remove a deck from the library
pub async fn delete_deck(settings: &Settings, id: &str) -> Result<()> {
    let db = Database::open(settings)?;
    let stored = find_deck(&db, id)?;

    db.delete_deck(&stored.id)?;
    println!("Deleted {} ({})", stored.deck.talk_title, stored.short_id());
    Ok(())
}

/// Print the transcription of a WAV file
pub async fn transcribe_audio(settings: &Settings, audio: &Path) -> Result<()> {
    let transcriber = WhisperTranscriber::from_settings(settings)?;
    let text = transcriber
        .transcribe_file(audio)
        .await
        .with_context(|| format!("Failed to transcribe {}", audio.display()))?;

    println!("{}", text);
    Ok(())
}

/// Turn spoken input into a new deck, or into an edit of an existing slide
pub async fn voice_command(
    settings: &Settings,
    audio: Option<PathBuf>,
    seconds: Option<u64>,
    deck: Option<String>,
    index: Option<usize>,
) -> Result<()> {
    let transcriber = WhisperTranscriber::from_settings(settings)?;

    let request = match audio {
        Some(path) => transcriber.transcribe_file(&path).await?,
        None => {
            let duration = Duration::from_secs(seconds.unwrap_or(settings.audio.max_seconds));
            let recorder = MicrophoneRecorder::new(settings);

            eprintln!("Recording for {}s, speak now...", duration.as_secs());
            let recorded = tokio::task::spawn_blocking(move || recorder.record(duration))
                .await
                .context("Recording task failed")??;
            transcriber.transcribe(&recorded.to_wav_bytes()?).await?
        }
    };

    if request.is_empty() {
        anyhow::bail!("Transcription was empty; nothing to do");
    }
    eprintln!("Heard: {}", request);

    match (deck, index) {
        (Some(id), Some(index)) => {
            let target = SlideTarget {
                index: Some(index),
                select: None,
            };
            edit_slide(settings, &id, target, &request).await
        }
        _ => new_deck(settings, &request, None).await,
    }
}

/// Handle config subcommands
pub fn config_command(settings: &Settings, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let toml = toml::to_string_pretty(&redacted(settings))?;
            println!("{}", toml);
        }
        ConfigCommand::Path => {
            let path = Settings::config_path()?;
            println!("{}", path.display());
        }
        ConfigCommand::Init { force } => {
            let path = Settings::config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists at {}. Use --force to overwrite.",
                    path.display()
                );
            }
            Settings::write_default(&path)?;
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

// Helper functions

fn store_new_deck(settings: &Settings, deck: SlideDeck, prompt: &str) -> Result<StoredDeck> {
    let mut db = Database::open(settings)?;
    let stored = StoredDeck::new(deck, Some(prompt.to_string()));
    db.insert_deck(&stored)?;

    println!(
        "Created deck {}: {} ({} slides)",
        stored.short_id(),
        stored.deck.talk_title,
        stored.deck.len()
    );
    println!();
    println!("{}", stored.deck.render());

    Ok(stored)
}

fn find_deck(db: &Database, id: &str) -> Result<StoredDeck> {
    db.find_deck_by_prefix(id)?.context("Deck not found")
}

fn default_output_path(settings: &Settings, deck: &SlideDeck) -> PathBuf {
    let slug = slugify(&deck.talk_title);
    let name = if slug.is_empty() { "deck".to_string() } else { slug };
    settings.general.output_dir.join(format!("{}.md", name))
}

/// Lowercase ASCII alphanumerics joined by single dashes
fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn redacted(settings: &Settings) -> Settings {
    let mut shown = settings.clone();
    for key in [
        &mut shown.llm.api_key,
        &mut shown.embeddings.api_key,
        &mut shown.transcription.api_key,
    ] {
        if !key.is_empty() {
            *key = "<set>".to_string();
        }
    }
    shown
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
