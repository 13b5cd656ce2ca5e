//! Text-to-speech output.

use crate::backend::SynthesisBackend;
use crate::directory::VoiceDirectory;
use crate::error::{VoiceError, VoiceResult};
use hark_types::{SpeechOptions, VoiceRef};
use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, error, warn};

const VOLUME_RANGE: RangeInclusive<f32> = 0.0..=1.0;
const RATE_RANGE: RangeInclusive<f32> = 0.1..=10.0;
const PITCH_RANGE: RangeInclusive<f32> = 0.0..=2.0;

/// A single speech request as handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Utterance {
    pub text: String,
    pub volume: Option<f32>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub voice: Option<VoiceRef>,
}

impl Utterance {
    /// Builds an utterance, rejecting options outside their documented ranges.
    pub fn new(text: impl Into<String>, options: &SpeechOptions) -> VoiceResult<Self> {
        check_range("volume", options.volume, &VOLUME_RANGE)?;
        check_range("rate", options.rate, &RATE_RANGE)?;
        check_range("pitch", options.pitch, &PITCH_RANGE)?;

        Ok(Self {
            text: text.into(),
            volume: options.volume,
            rate: options.rate,
            pitch: options.pitch,
            voice: options.voice.clone(),
        })
    }
}

fn as_synthesis_failure(err: VoiceError) -> VoiceError {
    match err {
        VoiceError::SynthesisFailed(_) => err,
        other => VoiceError::SynthesisFailed(other.to_string()),
    }
}

fn check_range(field: &str, value: Option<f32>, range: &RangeInclusive<f32>) -> VoiceResult<()> {
    match value {
        Some(v) if !v.is_finite() || !range.contains(&v) => Err(VoiceError::SynthesisFailed(format!(
            "{field} {v} is outside {}..={}",
            range.start(),
            range.end()
        ))),
        _ => Ok(()),
    }
}

type PlaybackErrorHandler = Arc<dyn Fn(&VoiceError) + Send + Sync>;

/// Speaks text through a synthesis backend, one utterance at a time.
pub struct SynthesisBridge {
    backend: Arc<dyn SynthesisBackend>,
    directory: VoiceDirectory,
    on_playback_error: Arc<Mutex<Option<PlaybackErrorHandler>>>,
}

impl SynthesisBridge {
    /// # Errors
    ///
    /// `SynthesisUnsupported` if no backend is available.
    pub fn new(
        backend: Option<Arc<dyn SynthesisBackend>>,
        discovery_timeout: Duration,
    ) -> VoiceResult<Self> {
        let backend = backend.ok_or(VoiceError::SynthesisUnsupported)?;
        let directory = VoiceDirectory::new(Arc::clone(&backend), discovery_timeout);

        let on_playback_error: Arc<Mutex<Option<PlaybackErrorHandler>>> = Arc::default();
        let routed = Arc::clone(&on_playback_error);
        backend.set_error_listener(Arc::new(move |err: VoiceError| {
            let err = as_synthesis_failure(err);
            error!(error = %err, "utterance failed during playback");
            let handler = routed.lock().unwrap_or_else(|e| e.into_inner()).clone();
            if let Some(handler) = handler {
                handler(&err);
            }
        }));

        Ok(Self {
            backend,
            directory,
            on_playback_error,
        })
    }

    /// Sets the handler for failures the backend reports after `speak`
    /// returned. Errors arrive as `SynthesisFailed`.
    pub fn on_playback_error(&self, handler: impl Fn(&VoiceError) + Send + Sync + 'static) {
        *self
            .on_playback_error
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(handler));
    }

    /// Speaks `text`, cutting off anything already playing.
    ///
    /// The voice in `options` is used when set; otherwise the directory's
    /// current selection; otherwise the backend default.
    ///
    /// # Errors
    ///
    /// `SynthesisFailed` when the options are malformed or the backend
    /// rejects the utterance.
    pub fn speak(&self, text: &str, options: &SpeechOptions) -> VoiceResult<()> {
        let mut utterance = Utterance::new(text, options)?;
        if utterance.voice.is_none() {
            utterance.voice = self.directory.current();
        }

        if self.backend.voices().is_empty() {
            warn!("no voices loaded, speaking with the backend default");
        }

        if self.backend.is_speaking() {
            debug!("already speaking, cancelling current utterance");
            self.backend.cancel();
        }

        self.backend.speak(&utterance).map_err(as_synthesis_failure)
    }

    pub fn cancel(&self) {
        self.backend.cancel();
    }

    pub fn is_speaking(&self) -> bool {
        self.backend.is_speaking()
    }

    /// Warms the voice list.
    ///
    /// Engines that gate audio behind user interaction may only load voices
    /// after such an event; call this from one.
    pub async fn preload_voices(&self) -> VoiceResult<()> {
        self.directory.list_voices().await.map(|_| ())
    }

    pub fn directory(&self) -> &VoiceDirectory {
        &self.directory
    }
}
