//! Transcription module for deckbot
//!
//! Turns recorded speech into a text request for the slide generator.

mod whisper;

pub use whisper::WhisperTranscriber;
