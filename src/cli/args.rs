//! CLI argument definitions using clap

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// deckbot - Draft and refine slide decks with an LLM
#[derive(Parser, Debug)]
#[command(name = "deckbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a new deck from a description of the talk
    New {
        /// What the talk is about, in as much or as little detail as you like
        prompt: String,

        /// Also save the rendered deck to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate a single slide and print it
    Slide {
        /// What the slide should show
        prompt: String,
    },

    /// List stored decks
    List {
        /// Maximum number of decks to show
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Search term to filter decks
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Print a stored deck
    Show {
        /// Deck ID or partial ID
        id: String,
    },

    /// Regenerate one slide of a deck
    Edit {
        /// Deck ID or partial ID
        id: String,

        #[command(flatten)]
        target: SlideTarget,

        /// The change you want
        change: String,
    },

    /// Generate a slide and insert it before a position
    Insert {
        /// Deck ID or partial ID
        id: String,

        /// Position to insert at (the deck length appends)
        #[arg(short, long)]
        index: usize,

        /// What the new slide should cover
        description: String,
    },

    /// Find the slide that best matches a description
    Select {
        /// Deck ID or partial ID
        id: String,

        /// Natural-language description of the slide
        description: String,
    },

    /// Write a deck as markdown
    Save {
        /// Deck ID or partial ID
        id: String,

        /// Output file (defaults to <output_dir>/<talk-title>.md)
        path: Option<PathBuf>,
    },

    /// Remove a deck from the library
    Delete {
        /// Deck ID or partial ID
        id: String,
    },

    /// Transcribe a WAV file
    Transcribe {
        /// Path to the audio file
        audio: PathBuf,
    },

    /// Speak a request: create a new deck, or edit a slide of an existing one
    Voice {
        /// Use this WAV file instead of recording from the microphone
        #[arg(long)]
        audio: Option<PathBuf>,

        /// Recording length in seconds
        #[arg(short, long)]
        seconds: Option<u64>,

        /// Deck to edit instead of creating a new one
        #[arg(long, requires = "index")]
        deck: Option<String>,

        /// Slide to edit (with --deck)
        #[arg(short, long, requires = "deck")]
        index: Option<usize>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Which slide an edit applies to
#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
pub struct SlideTarget {
    /// Slide position
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Pick the slide that best matches this description
    #[arg(long)]
    pub select: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}
