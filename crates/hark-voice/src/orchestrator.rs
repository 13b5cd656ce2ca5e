//! Wires recognition, the command registry and synthesis together.
//!
//! Every recognized phrase is dispatched synchronously on the thread that
//! delivered it: registry lookup, the command's action and callback, option
//! merge, then synthesis. Mood and base options are read once at the start
//! of a dispatch, so changing them mid-dispatch only affects later phrases.

use crate::backend::{RecognitionSession, SynthesisBackend};
use crate::config::VoiceConfig;
use crate::error::{VoiceError, VoiceResult};
use crate::merge;
use crate::recognition::RecognitionBridge;
use crate::registry::{self, Command, CommandRegistry, Dispatch};
use crate::synthesis::SynthesisBridge;
use hark_types::{Mood, MoodSettings, SpeechOptions, VoiceCriteria, VoiceRef};
use std::sync::{Arc, Mutex, RwLock};
use tracing::{error, info};

pub type PhraseHook = Arc<dyn Fn(&str) + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(&VoiceError) + Send + Sync>;

/// Application callbacks fired during dispatch.
#[derive(Clone, Default)]
pub struct Hooks {
    pub on_command_recognized: Option<PhraseHook>,
    pub on_command_unrecognized: Option<PhraseHook>,
    /// Receives recognition errors, failures to speak a response and
    /// failures reported by the backend during playback.
    pub on_error: Option<ErrorHook>,
}

impl Hooks {
    pub fn on_command_recognized(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_command_recognized = Some(Arc::new(hook));
        self
    }

    pub fn on_command_unrecognized(mut self, hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_command_unrecognized = Some(Arc::new(hook));
        self
    }

    pub fn on_error(mut self, hook: impl Fn(&VoiceError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }
}

#[derive(Debug, Clone)]
struct DispatchState {
    mood: Option<Mood>,
    tts_options: SpeechOptions,
}

pub struct Orchestrator {
    registry: RwLock<CommandRegistry>,
    recognition: RecognitionBridge,
    synthesis: SynthesisBridge,
    moods: MoodSettings,
    state: Mutex<DispatchState>,
    hooks: Hooks,
}

impl Orchestrator {
    /// Builds an orchestrator over the given platform capabilities.
    ///
    /// # Errors
    ///
    /// `RecognitionUnsupported` or `SynthesisUnsupported` when the matching
    /// capability is missing.
    pub fn new(
        recognition: Option<Box<dyn RecognitionSession>>,
        synthesis: Option<Arc<dyn SynthesisBackend>>,
        config: VoiceConfig,
        hooks: Hooks,
    ) -> VoiceResult<Arc<Self>> {
        let discovery_timeout = config.discovery_timeout();
        let recognition = RecognitionBridge::new(recognition, config.recognition)?;
        let synthesis = SynthesisBridge::new(synthesis, discovery_timeout)?;

        if let Some(on_error) = hooks.on_error.clone() {
            let on_playback_error = Arc::clone(&on_error);
            recognition.on_error(move |err| on_error(err));
            synthesis.on_playback_error(move |err| on_playback_error(err));
        }

        let orchestrator = Arc::new(Self {
            registry: RwLock::new(CommandRegistry::new()),
            recognition,
            synthesis,
            moods: config.moods,
            state: Mutex::new(DispatchState {
                mood: config.mood,
                tts_options: config.speech,
            }),
            hooks,
        });

        let weak = Arc::downgrade(&orchestrator);
        orchestrator.recognition.on_recognized(move |phrase| {
            if let Some(orchestrator) = weak.upgrade() {
                orchestrator.handle_phrase(&phrase);
            }
        });

        info!(
            lang = %orchestrator.recognition.options().lang,
            "voice orchestrator initialized"
        );
        Ok(orchestrator)
    }

    pub fn register_commands(&self, commands: impl IntoIterator<Item = Command>) {
        let mut registry = self.registry.write().unwrap_or_else(|e| e.into_inner());
        for command in commands {
            registry.register(&command.phrase, command.action);
        }
    }

    pub fn command_count(&self) -> usize {
        self.registry.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn start_listening(&self) -> VoiceResult<()> {
        self.recognition.start()
    }

    pub fn stop_listening(&self) -> VoiceResult<()> {
        self.recognition.stop()
    }

    /// Dispatches one recognized phrase.
    ///
    /// Called for every phrase the recognition session reports; also usable
    /// directly to drive commands from text.
    pub fn handle_phrase(&self, phrase: &str) -> Dispatch {
        let phrase = registry::normalize(phrase);
        let phrase = phrase.as_str();
        let snapshot = self.state.lock().unwrap_or_else(|e| e.into_inner()).clone();

        let action = self
            .registry
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .lookup(phrase);
        let response = match registry::execute(phrase, action) {
            Dispatch::Handled(response) => response,
            Dispatch::NotFound => {
                if let Some(hook) = &self.hooks.on_command_unrecognized {
                    hook(phrase);
                }
                return Dispatch::NotFound;
            }
        };

        if let Some(response) = response.as_ref().filter(|r| r.speak) {
            let mood_preset = snapshot.mood.map(|mood| self.moods.preset(mood));
            let effective = merge::resolve(
                &snapshot.tts_options,
                response.options.as_ref(),
                mood_preset.as_ref(),
            );
            if let Err(err) = self.synthesis.speak(&response.text, &effective) {
                error!(phrase = %phrase, error = %err, "failed to speak response");
                if let Some(hook) = &self.hooks.on_error {
                    hook(&err);
                }
            }
        }

        if let Some(hook) = &self.hooks.on_command_recognized {
            hook(phrase);
        }
        Dispatch::Handled(response)
    }

    /// Replaces the base speech options.
    pub fn set_tts_options(&self, options: SpeechOptions) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).tts_options = options;
    }

    pub fn tts_options(&self) -> SpeechOptions {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .tts_options
            .clone()
    }

    pub fn set_mood(&self, mood: Mood) {
        info!(mood = %mood, "mood changed");
        self.state.lock().unwrap_or_else(|e| e.into_inner()).mood = Some(mood);
    }

    /// Parses `name` and makes it the current mood.
    ///
    /// # Errors
    ///
    /// `UnknownMood` if `name` is not a known mood; the current mood is kept.
    pub fn set_mood_by_name(&self, name: &str) -> VoiceResult<Mood> {
        let mood: Mood = name.parse()?;
        self.set_mood(mood);
        Ok(mood)
    }

    pub fn clear_mood(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).mood = None;
    }

    pub fn mood(&self) -> Option<Mood> {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).mood
    }

    /// Selects the voice used for responses that do not name one.
    pub async fn set_voice(&self, criteria: &VoiceCriteria) -> VoiceResult<()> {
        self.synthesis.directory().select_voice(criteria).await?;
        Ok(())
    }

    pub fn current_voice(&self) -> Option<VoiceRef> {
        self.synthesis.directory().current()
    }

    pub async fn get_voices(&self) -> VoiceResult<Vec<VoiceRef>> {
        self.synthesis.directory().list_voices().await
    }

    pub async fn preload_voices(&self) -> VoiceResult<()> {
        self.synthesis.preload_voices().await
    }

    pub fn cancel_speech(&self) {
        self.synthesis.cancel();
    }

    pub fn is_speaking(&self) -> bool {
        self.synthesis.is_speaking()
    }
}
