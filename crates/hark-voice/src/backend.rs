//! Capability contracts for the platform speech services.
//!
//! The core never touches audio hardware itself. A recognition session turns
//! microphone input into transcript events, and a synthesis backend turns
//! utterances into sound. Both are supplied by the embedding application.

use crate::error::{VoiceError, VoiceResult};
use crate::synthesis::Utterance;
use hark_types::{RecognitionOptions, VoiceRef};
use std::sync::Arc;
use tokio::sync::broadcast;

/// One candidate transcript for a recognition result.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub transcript: String,
    pub confidence: f32,
}

impl Alternative {
    pub fn new(transcript: impl Into<String>, confidence: f32) -> Self {
        Self {
            transcript: transcript.into(),
            confidence,
        }
    }
}

/// Events a recognition session reports.
#[derive(Debug, Clone, PartialEq)]
pub enum RecognitionEvent {
    /// Alternatives are ordered best first.
    Result { alternatives: Vec<Alternative> },
    /// `code` is the backend's raw error code, if it supplied one.
    Error { code: Option<String> },
}

impl RecognitionEvent {
    /// A result with a single alternative.
    pub fn transcript(transcript: impl Into<String>, confidence: f32) -> Self {
        RecognitionEvent::Result {
            alternatives: vec![Alternative::new(transcript, confidence)],
        }
    }

    pub fn error(code: impl Into<String>) -> Self {
        RecognitionEvent::Error {
            code: Some(code.into()),
        }
    }
}

/// Receives every event a session reports.
pub type RecognitionListener = Arc<dyn Fn(RecognitionEvent) + Send + Sync>;

/// Receives failures that happen while an utterance is playing, after
/// `speak` has already returned.
pub type PlaybackErrorListener = Arc<dyn Fn(VoiceError) + Send + Sync>;

/// A single platform speech-recognition session.
pub trait RecognitionSession: Send {
    fn configure(&mut self, options: &RecognitionOptions);

    /// Begins listening. Repeated starts are left to the session to handle.
    fn start(&mut self) -> VoiceResult<()>;

    fn stop(&mut self) -> VoiceResult<()>;

    /// Installs the listener for this session's events, replacing any
    /// previous one.
    ///
    /// The listener must not be called from inside `start` or `stop`:
    /// dispatch may call back into the session.
    fn set_listener(&mut self, listener: RecognitionListener);
}

/// A platform speech-synthesis engine.
pub trait SynthesisBackend: Send + Sync {
    /// Starts speaking `utterance`. Returns once playback has been issued.
    fn speak(&self, utterance: &Utterance) -> VoiceResult<()>;

    /// Cuts off the utterance currently playing, if any.
    fn cancel(&self);

    fn is_speaking(&self) -> bool;

    /// The voices enumerable right now. May be empty while the engine is
    /// still loading its voice list.
    fn voices(&self) -> Vec<VoiceRef>;

    /// Subscribes to "voices changed" notifications. Dropping the receiver
    /// ends the subscription.
    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()>;

    /// Installs the listener for playback failures, replacing any previous
    /// one. Cancelled utterances are not failures.
    fn set_error_listener(&self, listener: PlaybackErrorListener);
}
