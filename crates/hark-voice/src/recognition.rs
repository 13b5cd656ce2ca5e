//! Speech-to-text input.
//!
//! Wraps one platform recognition session and turns its raw events into a
//! stream of normalised phrases and wrapped errors, delivered to whichever
//! handler was registered last.

use crate::backend::{RecognitionEvent, RecognitionSession};
use crate::error::{VoiceError, VoiceResult};
use hark_types::RecognitionOptions;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

pub type PhraseHandler = Arc<dyn Fn(String) + Send + Sync>;
pub type ErrorHandler = Arc<dyn Fn(&VoiceError) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    recognized: Mutex<Option<PhraseHandler>>,
    error: Mutex<Option<ErrorHandler>>,
}

impl Handlers {
    fn deliver(&self, event: RecognitionEvent) {
        match event {
            RecognitionEvent::Result { alternatives } => {
                let Some(best) = alternatives.first() else {
                    debug!("recognition result carried no alternatives");
                    return;
                };
                let phrase = best.transcript.trim().to_lowercase();
                debug!(phrase = %phrase, confidence = best.confidence, "speech recognized");

                let handler = self.recognized.lock().unwrap_or_else(|e| e.into_inner()).clone();
                if let Some(handler) = handler {
                    handler(phrase);
                }
            }
            RecognitionEvent::Error { code } => {
                let message = code
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| "Unknown error".to_string());
                let err = VoiceError::Recognition(message);

                let handler = self.error.lock().unwrap_or_else(|e| e.into_inner()).clone();
                match handler {
                    Some(handler) => handler(&err),
                    None => warn!(error = %err, "unhandled recognition error"),
                }
            }
        }
    }
}

pub struct RecognitionBridge {
    session: Mutex<Box<dyn RecognitionSession>>,
    options: RecognitionOptions,
    handlers: Arc<Handlers>,
}

impl RecognitionBridge {
    /// Configures `session` with `options` and starts routing its events.
    ///
    /// # Errors
    ///
    /// `RecognitionUnsupported` if no session is available.
    pub fn new(
        session: Option<Box<dyn RecognitionSession>>,
        options: RecognitionOptions,
    ) -> VoiceResult<Self> {
        let mut session = session.ok_or(VoiceError::RecognitionUnsupported)?;
        session.configure(&options);

        let handlers = Arc::new(Handlers::default());
        let routed = Arc::clone(&handlers);
        session.set_listener(Arc::new(move |event: RecognitionEvent| {
            routed.deliver(event)
        }));

        Ok(Self {
            session: Mutex::new(session),
            options,
            handlers,
        })
    }

    pub fn options(&self) -> &RecognitionOptions {
        &self.options
    }

    /// Failures from the session propagate unchanged.
    pub fn start(&self) -> VoiceResult<()> {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).start()
    }

    pub fn stop(&self) -> VoiceResult<()> {
        self.session.lock().unwrap_or_else(|e| e.into_inner()).stop()
    }

    /// Sets the handler called with each recognized phrase, trimmed and
    /// lowercased.
    pub fn on_recognized(&self, handler: impl Fn(String) + Send + Sync + 'static) {
        *self
            .handlers
            .recognized
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(handler));
    }

    pub fn on_error(&self, handler: impl Fn(&VoiceError) + Send + Sync + 'static) {
        *self.handlers.error.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(handler));
    }
}
