//! Synthesis backend driving the `espeak-ng` command-line engine.
//!
//! Each utterance runs as its own `espeak-ng` process reading text from
//! stdin, supervised by a tokio task; cancelling kills that process. The
//! voice list is read once, in the background, from `espeak-ng --voices`.

use crate::backend::{PlaybackErrorListener, SynthesisBackend};
use crate::error::{VoiceError, VoiceResult};
use crate::synthesis::Utterance;
use hark_types::VoiceRef;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::{Child, ChildStdin, Command};
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub const DEFAULT_ESPEAK_BINARY: &str = "espeak-ng";

/// Bound on `--version` and `--voices` invocations.
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// espeak-ng's default speed in words per minute.
const BASE_WORDS_PER_MINUTE: f32 = 175.0;
/// espeak-ng's default amplitude; its scale runs 0..=200.
const BASE_AMPLITUDE: f32 = 100.0;
/// espeak-ng's default pitch; its scale runs 0..=99.
const BASE_PITCH: f32 = 50.0;

#[derive(Debug)]
enum VoiceLoad {
    Idle,
    Loading,
    Loaded(Vec<VoiceRef>),
    Failed,
}

/// The utterance currently owned by a supervising task.
struct Playback {
    cancel: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

type ErrorSlot = Arc<Mutex<Option<PlaybackErrorListener>>>;

pub struct EspeakBackend {
    binary: PathBuf,
    playback: Mutex<Option<Playback>>,
    voices: Arc<Mutex<VoiceLoad>>,
    changed: broadcast::Sender<()>,
    on_error: ErrorSlot,
}

impl EspeakBackend {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        let (changed, _) = broadcast::channel(4);
        Self {
            binary: binary.as_ref().to_path_buf(),
            playback: Mutex::new(None),
            voices: Arc::new(Mutex::new(VoiceLoad::Idle)),
            changed,
            on_error: Arc::default(),
        }
    }

    /// Returns a backend if `binary` runs, `None` otherwise.
    pub async fn detect(binary: impl AsRef<Path>) -> Option<Self> {
        let binary = binary.as_ref();
        let status = Command::new(binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status();

        match tokio::time::timeout(QUERY_TIMEOUT, status).await {
            Ok(Ok(status)) if status.success() => Some(Self::new(binary)),
            Ok(Ok(status)) => {
                warn!(binary = %binary.display(), %status, "espeak-ng version check failed");
                None
            }
            Ok(Err(e)) => {
                warn!(binary = %binary.display(), error = %e, "espeak-ng not found");
                None
            }
            Err(_) => {
                warn!(binary = %binary.display(), "espeak-ng version check timed out");
                None
            }
        }
    }
}

async fn load_voices(binary: &Path) -> VoiceResult<Vec<VoiceRef>> {
    let output = Command::new(binary)
        .arg("--voices")
        .kill_on_drop(true)
        .output();

    let output = tokio::time::timeout(QUERY_TIMEOUT, output)
        .await
        .map_err(|_| {
            VoiceError::Backend(format!(
                "espeak-ng --voices timed out after {} seconds",
                QUERY_TIMEOUT.as_secs()
            ))
        })?
        .map_err(|e| VoiceError::Backend(format!("failed to run espeak-ng --voices: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VoiceError::Backend(format!("espeak-ng --voices failed: {stderr}")));
    }
    Ok(parse_voice_listing(&String::from_utf8_lossy(&output.stdout)))
}

/// Feeds `text` to the process and waits for it, unless cancelled first.
async fn supervise(
    mut child: Child,
    stdin: ChildStdin,
    text: String,
    cancelled: oneshot::Receiver<()>,
    on_error: ErrorSlot,
) {
    let outcome = tokio::select! {
        biased;
        _ = cancelled => None,
        outcome = play(&mut child, stdin, text) => Some(outcome),
    };

    match outcome {
        Some(Ok(())) => debug!("espeak-ng finished"),
        Some(Err(reason)) => {
            warn!(reason = %reason, "espeak-ng playback failed");
            let listener = on_error.lock().unwrap_or_else(|e| e.into_inner()).clone();
            if let Some(listener) = listener {
                listener(VoiceError::SynthesisFailed(reason));
            }
        }
        None => {
            let _ = child.kill().await;
            debug!("espeak-ng cancelled");
        }
    }
}

async fn play(child: &mut Child, mut stdin: ChildStdin, text: String) -> Result<(), String> {
    stdin
        .write_all(text.as_bytes())
        .await
        .map_err(|e| format!("failed to write to espeak-ng stdin: {e}"))?;
    drop(stdin);

    let status = child
        .wait()
        .await
        .map_err(|e| format!("failed to wait for espeak-ng: {e}"))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("espeak-ng exited with {status}"))
    }
}

impl SynthesisBackend for EspeakBackend {
    fn speak(&self, utterance: &Utterance) -> VoiceResult<()> {
        let runtime = Handle::try_current()
            .map_err(|_| VoiceError::Backend("espeak-ng playback needs a tokio runtime".into()))?;

        let mut child = Command::new(&self.binary)
            .arg("--stdin")
            .args(speech_args(utterance))
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Backend(format!("failed to spawn espeak-ng: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| VoiceError::Backend("failed to open espeak-ng stdin".to_string()))?;

        let (cancel, cancelled) = oneshot::channel();
        let task = runtime.spawn(supervise(
            child,
            stdin,
            utterance.text.clone(),
            cancelled,
            Arc::clone(&self.on_error),
        ));

        let previous = self
            .playback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(Playback { cancel, task });
        if let Some(previous) = previous {
            let _ = previous.cancel.send(());
        }
        debug!("espeak-ng speaking");
        Ok(())
    }

    fn cancel(&self) {
        if let Some(playback) = self.playback.lock().unwrap_or_else(|e| e.into_inner()).take() {
            let _ = playback.cancel.send(());
        }
    }

    fn is_speaking(&self) -> bool {
        self.playback
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|playback| !playback.task.is_finished())
    }

    /// Returns the cached list. The first call starts loading it in the
    /// background and signals a change once the load settles, whether it
    /// succeeded or not. A failed load is not retried.
    fn voices(&self) -> Vec<VoiceRef> {
        let mut state = self.voices.lock().unwrap_or_else(|e| e.into_inner());
        match &*state {
            VoiceLoad::Loaded(voices) => return voices.clone(),
            VoiceLoad::Loading | VoiceLoad::Failed => return Vec::new(),
            VoiceLoad::Idle => {}
        }

        let Ok(runtime) = Handle::try_current() else {
            debug!("no tokio runtime, espeak-ng voices not loaded");
            return Vec::new();
        };
        *state = VoiceLoad::Loading;

        let binary = self.binary.clone();
        let shared = Arc::clone(&self.voices);
        let changed = self.changed.clone();
        runtime.spawn(async move {
            let loaded = match load_voices(&binary).await {
                Ok(voices) => {
                    info!(count = voices.len(), "espeak-ng voices loaded");
                    VoiceLoad::Loaded(voices)
                }
                Err(e) => {
                    warn!(error = %e, "could not list espeak-ng voices");
                    VoiceLoad::Failed
                }
            };
            *shared.lock().unwrap_or_else(|e| e.into_inner()) = loaded;
            let _ = changed.send(());
        });
        Vec::new()
    }

    fn subscribe_voices_changed(&self) -> broadcast::Receiver<()> {
        self.changed.subscribe()
    }

    fn set_error_listener(&self, listener: PlaybackErrorListener) {
        *self.on_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }
}

impl Drop for EspeakBackend {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Command-line flags for `utterance`, text excluded.
fn speech_args(utterance: &Utterance) -> Vec<String> {
    let mut args = Vec::new();
    if let Some(volume) = utterance.volume {
        args.push("-a".to_string());
        args.push(((volume * BASE_AMPLITUDE).round() as u32).to_string());
    }
    if let Some(rate) = utterance.rate {
        args.push("-s".to_string());
        args.push(((rate * BASE_WORDS_PER_MINUTE).round() as u32).to_string());
    }
    if let Some(pitch) = utterance.pitch {
        args.push("-p".to_string());
        args.push(((pitch * BASE_PITCH).round() as u32).min(99).to_string());
    }
    if let Some(voice) = &utterance.voice {
        args.push("-v".to_string());
        args.push(voice.voice_uri.clone());
    }
    args
}

/// Parses the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 10)
/// ```
fn parse_voice_listing(listing: &str) -> Vec<VoiceRef> {
    listing
        .lines()
        .filter(|line| !line.trim_start().starts_with("Pty"))
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            match columns.as_slice() {
                [_, lang, _, name, file, ..] => Some(VoiceRef::new(
                    name.replace('_', " "),
                    canonical_lang(lang),
                    *file,
                )),
                _ => None,
            }
        })
        .collect()
}

/// Normalises tag casing: `en-us` becomes `en-US`, `sr-latn` becomes
/// `sr-Latn`.
fn canonical_lang(tag: &str) -> String {
    tag.split('-')
        .enumerate()
        .map(|(i, part)| {
            let lower = part.to_ascii_lowercase();
            if i == 0 {
                lower
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                part.to_ascii_uppercase()
            } else if part.len() == 4 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                let mut chars = lower.chars();
                match chars.next() {
                    Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                    None => lower,
                }
            } else {
                lower
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
