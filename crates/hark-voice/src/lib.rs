//! Voice-command core for Hark.
//!
//! Binds a speech-recognition session to a registry of phrase-triggered
//! commands and speaks their responses through a synthesis backend.
//!
//! ```text
//! recognition session ─▶ RecognitionBridge ─▶ Orchestrator ─▶ CommandRegistry
//!                                                  │
//!                         merge::resolve ◀─────────┘ (base / command / mood)
//!                                │
//!                         SynthesisBridge ─▶ synthesis backend
//!                                │
//!                          VoiceDirectory (bounded voice discovery)
//! ```
//!
//! Platform speech services are reached only through the capability traits
//! in [`backend`]. [`espeak`] provides one concrete synthesis backend.

pub mod backend;
pub mod config;
pub mod directory;
pub mod error;
pub mod espeak;
pub mod merge;
pub mod orchestrator;
pub mod recognition;
pub mod registry;
pub mod synthesis;

pub use backend::{
    Alternative, PlaybackErrorListener, RecognitionEvent, RecognitionListener,
    RecognitionSession, SynthesisBackend,
};
pub use config::{VoiceConfig, DEFAULT_DISCOVERY_TIMEOUT};
pub use directory::VoiceDirectory;
pub use error::{VoiceError, VoiceResult};
pub use espeak::EspeakBackend;
pub use orchestrator::{Hooks, Orchestrator};
pub use recognition::RecognitionBridge;
pub use registry::{Command, CommandRegistry, CommandResponse, Dispatch};
pub use synthesis::{SynthesisBridge, Utterance};
