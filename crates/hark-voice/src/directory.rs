//! Voice discovery and the current voice selection.

use crate::backend::SynthesisBackend;
use crate::error::{VoiceError, VoiceResult};
use hark_types::{VoiceCriteria, VoiceRef};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Resolves voice queries against a synthesis backend and remembers the
/// selected voice.
///
/// A `None` selection is valid and means "use the backend default".
pub struct VoiceDirectory {
    backend: Arc<dyn SynthesisBackend>,
    timeout: Duration,
    current: Mutex<Option<VoiceRef>>,
    // Bumped each time a bounded wait finishes.
    completed: AtomicU64,
    // At most one discovery waits on the backend at a time. Holds the
    // outcome of the most recent wait.
    discovery: tokio::sync::Mutex<Option<VoiceResult<Vec<VoiceRef>>>>,
}

impl VoiceDirectory {
    pub fn new(backend: Arc<dyn SynthesisBackend>, timeout: Duration) -> Self {
        Self {
            backend,
            timeout,
            current: Mutex::new(None),
            completed: AtomicU64::new(0),
            discovery: tokio::sync::Mutex::new(None),
        }
    }

    /// Returns the backend's voices, waiting for them to load if needed.
    ///
    /// Some engines report an empty list until their voices finish loading
    /// and then signal a change. This waits for that signal for at most the
    /// configured timeout. A caller arriving while a wait is in flight
    /// shares its outcome instead of starting a wait of its own.
    ///
    /// # Errors
    ///
    /// `VoicesUnavailable` if the change signal arrives but the list is still
    /// empty, `VoicesTimeout` if no signal arrives in time. Both may be
    /// retried. An `Ok` list is never empty.
    pub async fn list_voices(&self) -> VoiceResult<Vec<VoiceRef>> {
        let arrived_after = self.completed.load(Ordering::SeqCst);
        let mut last_outcome = self.discovery.lock().await;

        let voices = self.backend.voices();
        if !voices.is_empty() {
            return Ok(voices);
        }

        if self.completed.load(Ordering::SeqCst) != arrived_after {
            if let Some(outcome) = last_outcome.as_ref() {
                debug!("sharing the outcome of the discovery this call queued behind");
                return outcome.clone();
            }
        }

        let outcome = self.wait_for_voices().await;
        *last_outcome = Some(outcome.clone());
        self.completed.fetch_add(1, Ordering::SeqCst);
        outcome
    }

    async fn wait_for_voices(&self) -> VoiceResult<Vec<VoiceRef>> {
        // Subscribe before re-reading so a change between the two is not lost.
        let mut changed = self.backend.subscribe_voices_changed();
        let voices = self.backend.voices();
        if !voices.is_empty() {
            return Ok(voices);
        }

        debug!(timeout_ms = self.timeout.as_millis() as u64, "waiting for voices to load");
        let outcome = tokio::time::timeout(self.timeout, changed.recv()).await;
        drop(changed);

        match outcome {
            Ok(Ok(())) | Ok(Err(RecvError::Lagged(_))) => {
                let voices = self.backend.voices();
                if voices.is_empty() {
                    Err(VoiceError::VoicesUnavailable)
                } else {
                    info!(count = voices.len(), "voices loaded");
                    Ok(voices)
                }
            }
            Ok(Err(RecvError::Closed)) => Err(VoiceError::VoicesUnavailable),
            Err(_) => Err(VoiceError::VoicesTimeout(self.timeout)),
        }
    }

    /// Picks a voice for `criteria` and makes it the current selection.
    ///
    /// Falls back to the first listed voice when nothing matches. Discovery
    /// failures, including an engine with no voices at all, leave the
    /// current selection as it was.
    pub async fn select_voice(&self, criteria: &VoiceCriteria) -> VoiceResult<VoiceRef> {
        let voices = self.list_voices().await?;

        let selected = match voices.iter().find(|v| criteria.matches(v)) {
            Some(voice) => voice.clone(),
            None => {
                warn!(
                    language = %criteria.language,
                    "no voice matches the criteria, defaulting to the first available voice"
                );
                voices.first().cloned().ok_or(VoiceError::VoicesUnavailable)?
            }
        };

        info!(voice = %selected.name, lang = %selected.lang, "voice selected");
        self.set_current(Some(selected.clone()));
        Ok(selected)
    }

    pub fn current(&self) -> Option<VoiceRef> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_current(&self, voice: Option<VoiceRef>) {
        *self.current.lock().unwrap_or_else(|e| e.into_inner()) = voice;
    }
}
