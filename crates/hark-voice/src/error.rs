use hark_types::ParseMoodError;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for voice operations.
pub type VoiceResult<T> = Result<T, VoiceError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VoiceError {
    #[error("speech recognition is not supported on this platform")]
    RecognitionUnsupported,

    #[error("recognition error: {0}")]
    Recognition(String),

    #[error("speech synthesis is not supported on this platform")]
    SynthesisUnsupported,

    #[error("speech synthesis failed: {0}")]
    SynthesisFailed(String),

    #[error("voices are still not available after the backend reported a change")]
    VoicesUnavailable,

    #[error("voices did not load within {}ms", .0.as_millis())]
    VoicesTimeout(Duration),

    #[error("unknown mood: {0}")]
    UnknownMood(String),

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<ParseMoodError> for VoiceError {
    fn from(err: ParseMoodError) -> Self {
        VoiceError::UnknownMood(err.0)
    }
}
