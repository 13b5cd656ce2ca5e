//! A recognition session that treats each line typed on a terminal as a
//! final transcript.

use hark_types::RecognitionOptions;
use hark_voice::{
    RecognitionEvent, RecognitionListener, RecognitionSession, VoiceError, VoiceResult,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

type Source = Box<dyn AsyncBufRead + Send + Unpin>;
type ListenerSlot = Arc<Mutex<Option<RecognitionListener>>>;

/// Typed lines arrive with full confidence.
const TYPED_CONFIDENCE: f32 = 1.0;

/// Reads transcripts from a line-oriented source, stdin by default.
///
/// The reader task outlives `stop`: lines read while stopped are dropped.
/// Without `continuous`, the session stops itself after each result.
pub struct ConsoleSession {
    source: Option<Source>,
    listener: ListenerSlot,
    running: Arc<AtomicBool>,
    continuous: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl ConsoleSession {
    pub fn stdin() -> Self {
        Self::from_reader(tokio::io::BufReader::new(tokio::io::stdin()))
    }

    pub fn from_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            source: Some(Box::new(reader)),
            listener: Arc::new(Mutex::new(None)),
            running: Arc::new(AtomicBool::new(false)),
            continuous: Arc::new(AtomicBool::new(false)),
            reader: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

async fn read_lines(
    source: Source,
    listener: ListenerSlot,
    running: Arc<AtomicBool>,
    continuous: Arc<AtomicBool>,
) {
    let mut lines = source.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "console read failed");
                emit(&listener, RecognitionEvent::error("io"));
                break;
            }
        };
        if !running.load(Ordering::SeqCst) {
            debug!("console session stopped, dropping input");
            continue;
        }
        let transcript = line.trim();
        if transcript.is_empty() {
            continue;
        }
        if !continuous.load(Ordering::SeqCst) {
            running.store(false, Ordering::SeqCst);
        }
        emit(
            &listener,
            RecognitionEvent::transcript(transcript, TYPED_CONFIDENCE),
        );
    }
    running.store(false, Ordering::SeqCst);
    info!("console input closed");
}

fn emit(listener: &Mutex<Option<RecognitionListener>>, event: RecognitionEvent) {
    let listener = listener
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    if let Some(listener) = listener {
        listener(event);
    }
}

impl RecognitionSession for ConsoleSession {
    fn configure(&mut self, options: &RecognitionOptions) {
        self.continuous.store(options.continuous, Ordering::SeqCst);
    }

    fn start(&mut self) -> VoiceResult<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("console session already running");
            return Ok(());
        }

        if self.source.is_some() {
            let Ok(runtime) = Handle::try_current() else {
                self.running.store(false, Ordering::SeqCst);
                return Err(VoiceError::Backend(
                    "console input needs a tokio runtime".to_string(),
                ));
            };
            if let Some(source) = self.source.take() {
                self.reader = Some(runtime.spawn(read_lines(
                    source,
                    Arc::clone(&self.listener),
                    Arc::clone(&self.running),
                    Arc::clone(&self.continuous),
                )));
            }
        } else if self.reader.as_ref().map_or(true, JoinHandle::is_finished) {
            warn!("console input is exhausted, nothing more to read");
            self.running.store(false, Ordering::SeqCst);
        }
        Ok(())
    }

    fn stop(&mut self) -> VoiceResult<()> {
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn set_listener(&mut self, listener: RecognitionListener) {
        *self.listener.lock().unwrap_or_else(|e| e.into_inner()) = Some(listener);
    }
}
