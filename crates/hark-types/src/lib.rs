//! Shared types for the Hark voice-command workspace.
//!
//! This crate holds the plain data model that the core (`hark-voice`) and
//! the command-line front end (`hark-cli`) both speak: speech options and
//! their field-wise overlay, the closed set of moods with their default
//! presets, recognition session settings, and voice descriptors.
//!
//! Everything here is `serde`-derivable so configuration files can carry
//! the same structures the runtime uses.

pub mod mood;
pub mod speech;
pub mod voice;

pub use mood::{Mood, MoodSettings, ParseMoodError};
pub use speech::{RecognitionOptions, SpeechOptions};
pub use voice::{VoiceCriteria, VoiceRef};
