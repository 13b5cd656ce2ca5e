//! In-memory speech backends for exercising the core without audio devices.
#![allow(dead_code)]

pub use hark_types::VoiceRef;
use hark_types::RecognitionOptions;
use hark_voice::{
    PlaybackErrorListener, RecognitionEvent, RecognitionListener, RecognitionSession,
    SynthesisBackend, Utterance, VoiceError, VoiceResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub fn us_english() -> VoiceRef {
    VoiceRef::new("Google US English", "en-US", "googleusenglish")
}

pub fn uk_english() -> VoiceRef {
    VoiceRef::new("Google UK English Female", "en-GB", "googleukenglishfemale")
}

/// What the recording backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Speak(Utterance),
    Cancel,
}

pub struct RecordingBackend {
    calls: Mutex<Vec<Call>>,
    voices: Mutex<Vec<VoiceRef>>,
    speaking: AtomicBool,
    failure: Mutex<Option<String>>,
    changed: broadcast::Sender<()>,
    on_error: Mutex<Option<PlaybackErrorListener>>,
}

impl RecordingBackend {
    pub fn new(voices: Vec<VoiceRef>) -> Arc<Self> {
        let (changed, _) = broadcast::channel(4);
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            voices: Mutex::new(voices),
            speaking: AtomicBool::new(false),
            failure: Mutex::new(None),
            changed,
            on_error: Mutex::new(None),
        })
    }

    /// Replaces the voice list without signalling a change.
    pub fn set_voices(&self, voices: Vec<VoiceRef>) {
        *self.voices.lock().unwrap() = voices;
    }

    pub fn emit_voices_changed(&self) {
        let _ = self.changed.send(());
    }

    pub fn subscriber_count(&self) -> usize {
        self.changed.receiver_count()
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.speaking.store(speaking, Ordering::SeqCst);
    }

    /// Makes every following `speak` fail with `reason`.
    pub fn fail_with(&self, reason: &str) {
        *self.failure.lock().unwrap() = Some(reason.to_string());
    }

    /// Reports that the utterance in progress failed, as an engine would
    /// after `speak` returned.
    pub fn fail_playback(&self, reason: &str) {
        self.speaking.store(false, Ordering::SeqCst);
        let listener = self.on_error.lock().unwrap().clone();
        if let Some(listener) = listener {
            listener(VoiceError::Backend(reason.to_string()));
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spoken(&self) -> Vec<Utterance> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Speak(utterance) => Some(utterance),
                Call::Cancel => None,
            })
            .collect()
    }
}

impl SynthesisBackend for RecordingBackend {
    fn speak(&self, utterance: &Utterance) -> VoiceResult<()> {
        if let Some(reason) = self.failure.lock().unwrap().clone() {
            return Err(VoiceError::Backend(reason));
        }
        self.calls.lock().unwrap().push(Call::Speak(utterance.clone()));
        self.speaking.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn cancel(&self) {
        self.calls.lock().unwrap().push(Call::Cancel);
        self.speaking.store(false, Ordering::SeqCst);
    }

    fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::SeqCst)
    }

    fn voices(&self) -> Vec<VoiceRef> {
        self.voices.lock().unwrap().clone()
    }

    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()> {
        self.changed.subscribe()
    }

    fn set_error_listener(&self, listener: PlaybackErrorListener) {
        *self.on_error.lock().unwrap() = Some(listener);
    }
}

#[derive(Default)]
struct SessionState {
    options: Option<RecognitionOptions>,
    listener: Option<RecognitionListener>,
    starts: usize,
    stops: usize,
    start_failure: Option<String>,
}

/// A recognition session whose events are emitted by the test.
#[derive(Clone, Default)]
pub struct ScriptedSession {
    state: Arc<Mutex<SessionState>>,
}

impl ScriptedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Option<Box<dyn RecognitionSession>> {
        Some(Box::new(self.clone()))
    }

    pub fn emit(&self, event: RecognitionEvent) {
        let listener = self.state.lock().unwrap().listener.clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    pub fn say(&self, transcript: &str) {
        self.emit(RecognitionEvent::transcript(transcript, 0.9));
    }

    pub fn fail_start_with(&self, reason: &str) {
        self.state.lock().unwrap().start_failure = Some(reason.to_string());
    }

    pub fn options(&self) -> Option<RecognitionOptions> {
        self.state.lock().unwrap().options.clone()
    }

    pub fn starts(&self) -> usize {
        self.state.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.state.lock().unwrap().stops
    }
}

impl RecognitionSession for ScriptedSession {
    fn configure(&mut self, options: &RecognitionOptions) {
        self.state.lock().unwrap().options = Some(options.clone());
    }

    fn start(&mut self) -> VoiceResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.start_failure.clone() {
            return Err(VoiceError::Backend(reason));
        }
        state.starts += 1;
        Ok(())
    }

    fn stop(&mut self) -> VoiceResult<()> {
        self.state.lock().unwrap().stops += 1;
        Ok(())
    }

    fn set_listener(&mut self, listener: RecognitionListener) {
        self.state.lock().unwrap().listener = Some(listener);
    }
}

pub fn synthesis(backend: &Arc<RecordingBackend>) -> Option<Arc<dyn SynthesisBackend>> {
    Some(Arc::clone(backend) as Arc<dyn SynthesisBackend>)
}
