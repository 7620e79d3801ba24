//! Audio capture module for deckbot
//!
//! Records spoken requests from the microphone for transcription.

mod microphone;

pub use microphone::{MicrophoneRecorder, RecordedAudio};
