//! Phrase to action mapping.
//!
//! Keys are stored lowercased and lookups lowercase their input, so matching
//! is case-insensitive. Registering a phrase twice replaces the earlier
//! action.

use hark_types::SpeechOptions;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Work run when a registered phrase is heard.
pub type Action = Arc<dyn Fn() -> Option<CommandResponse> + Send + Sync>;

/// Follow-up run once, straight after the action that produced it.
pub type Callback = Box<dyn FnOnce() + Send>;

/// What a command's action hands back to the dispatcher.
pub struct CommandResponse {
    pub text: String,
    /// Whether `text` should be spoken. Default: `false`.
    pub speak: bool,
    /// Per-command speech options, layered above the base options.
    pub options: Option<SpeechOptions>,
    pub callback: Option<Callback>,
}

impl CommandResponse {
    /// A silent response.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            speak: false,
            options: None,
            callback: None,
        }
    }

    /// A response that should be spoken aloud.
    pub fn spoken(text: impl Into<String>) -> Self {
        Self {
            speak: true,
            ..Self::new(text)
        }
    }

    pub fn with_options(mut self, options: SpeechOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_callback(mut self, callback: impl FnOnce() + Send + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandResponse")
            .field("text", &self.text)
            .field("speak", &self.speak)
            .field("options", &self.options)
            .field("callback", &self.callback.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// A phrase and the action it triggers.
#[derive(Clone)]
pub struct Command {
    pub phrase: String,
    pub action: Action,
}

impl Command {
    pub fn new<F, R>(phrase: impl Into<String>, action: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: Into<Option<CommandResponse>>,
    {
        Self {
            phrase: phrase.into(),
            action: Arc::new(move || action().into()),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("phrase", &self.phrase)
            .finish_non_exhaustive()
    }
}

/// Outcome of executing a phrase against the registry.
#[derive(Debug)]
pub enum Dispatch {
    /// A command matched. Carries whatever its action returned; any callback
    /// has already run and been taken.
    Handled(Option<CommandResponse>),
    NotFound,
}

pub fn normalize(phrase: &str) -> String {
    phrase.to_lowercase()
}

#[derive(Default)]
pub struct CommandRegistry {
    commands: HashMap<String, Action>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, phrase: &str, action: Action) {
        let key = normalize(phrase);
        if self.commands.insert(key.clone(), action).is_some() {
            debug!(phrase = %key, "replaced existing command");
        }
    }

    /// Finds the action for `phrase` without running it.
    pub fn lookup(&self, phrase: &str) -> Option<Action> {
        self.commands.get(&normalize(phrase)).cloned()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Runs the action found for `phrase`, followed by its response's callback.
///
/// Takes the result of [`CommandRegistry::lookup`] rather than the registry
/// itself, so actions run with no registry lock held and may register
/// further commands.
pub fn execute(phrase: &str, action: Option<Action>) -> Dispatch {
    let Some(action) = action else {
        warn!(phrase = %phrase, "no command registered for phrase");
        return Dispatch::NotFound;
    };

    let mut response = action();
    if let Some(callback) = response.as_mut().and_then(|r| r.callback.take()) {
        callback();
    }
    Dispatch::Handled(response)
}
