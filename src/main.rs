//! deckbot - Draft and refine slide decks with an LLM
//!
//! Entry point for the deckbot CLI application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use deckbot::cli::commands;
use deckbot::cli::{Cli, Commands};
use deckbot::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    tracing::debug!("{} {}", deckbot::APP_NAME, deckbot::VERSION);

    if let Commands::Completions { shell } = cli.command {
        deckbot::cli::completions::print(shell);
        return Ok(());
    }

    // Load configuration only for runtime commands.
    let settings = Settings::load()?;

    match cli.command {
        Commands::New { prompt, output } => {
            commands::new_deck(&settings, &prompt, output).await?;
        }
        Commands::Slide { prompt } => {
            commands::new_slide(&settings, &prompt).await?;
        }
        Commands::List { limit, search } => {
            commands::list_decks(&settings, limit, search).await?;
        }
        Commands::Show { id } => {
            commands::show_deck(&settings, &id).await?;
        }
        Commands::Edit { id, target, change } => {
            commands::edit_slide(&settings, &id, target, &change).await?;
        }
        Commands::Insert {
            id,
            index,
            description,
        } => {
            commands::insert_slide(&settings, &id, index, &description).await?;
        }
        Commands::Select { id, description } => {
            commands::select_slide(&settings, &id, &description).await?;
        }
        Commands::Save { id, path } => {
            commands::save_deck(&settings, &id, path).await?;
        }
        Commands::Delete { id } => {
            commands::delete_deck(&settings, &id).await?;
        }
        Commands::Transcribe { audio } => {
            commands::transcribe_audio(&settings, &audio).await?;
        }
        Commands::Voice {
            audio,
            seconds,
            deck,
            index,
        } => {
            commands::voice_command(&settings, audio, seconds, deck, index).await?;
        }
        Commands::Config(config_cmd) => {
            commands::config_command(&settings, config_cmd)?;
        }
        Commands::Completions { .. } => unreachable!(),
    }

    Ok(())
}
