mod common;

use common::{synthesis, uk_english, us_english, Call, RecordingBackend};
use hark_types::{SpeechOptions, VoiceCriteria};
use hark_voice::{SynthesisBridge, Utterance, VoiceError, DEFAULT_DISCOVERY_TIMEOUT};
use std::sync::Arc;

fn bridge(backend: &Arc<RecordingBackend>) -> SynthesisBridge {
    SynthesisBridge::new(synthesis(backend), DEFAULT_DISCOVERY_TIMEOUT)
        .expect("backend is present")
}

#[test]
fn missing_backend_is_fatal() {
    let result = SynthesisBridge::new(None, DEFAULT_DISCOVERY_TIMEOUT);
    assert!(matches!(result, Err(VoiceError::SynthesisUnsupported)));
}

#[test]
fn speak_passes_text_and_options_through() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge
        .speak("Hello World", &SpeechOptions::new(0.8, 1.2, 1.5))
        .unwrap();

    let expected = Utterance::new("Hello World", &SpeechOptions::new(0.8, 1.2, 1.5)).unwrap();
    assert_eq!(backend.calls(), vec![Call::Speak(expected)]);
}

#[test]
fn newer_speech_preempts_the_active_utterance() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge.speak("first", &SpeechOptions::default()).unwrap();
    bridge.speak("second", &SpeechOptions::default()).unwrap();

    let calls = backend.calls();
    assert_eq!(calls.len(), 3);
    assert!(matches!(&calls[0], Call::Speak(u) if u.text == "first"));
    assert_eq!(calls[1], Call::Cancel);
    assert!(matches!(&calls[2], Call::Speak(u) if u.text == "second"));
}

#[test]
fn idle_backend_is_not_cancelled() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge.speak("one", &SpeechOptions::default()).unwrap();
    backend.set_speaking(false);
    bridge.speak("two", &SpeechOptions::default()).unwrap();

    assert!(!backend.calls().contains(&Call::Cancel));
    assert_eq!(backend.spoken().len(), 2);
}

#[test]
fn backend_failure_surfaces_as_synthesis_failed() {
    let backend = RecordingBackend::new(vec![us_english()]);
    backend.fail_with("not-allowed");
    let bridge = bridge(&backend);

    match bridge.speak("hello", &SpeechOptions::default()) {
        Err(VoiceError::SynthesisFailed(reason)) => assert!(reason.contains("not-allowed")),
        other => panic!("expected SynthesisFailed, got {other:?}"),
    }
}

#[test]
fn playback_failure_reaches_the_handler_as_synthesis_failed() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);
    let failures = Arc::new(std::sync::Mutex::new(Vec::new()));
    bridge.on_playback_error({
        let sink = Arc::clone(&failures);
        move |err: &VoiceError| sink.lock().unwrap().push(err.clone())
    });

    bridge.speak("hello", &SpeechOptions::default()).unwrap();
    backend.fail_playback("voice-unavailable");

    let failures = failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(
        matches!(&failures[0], VoiceError::SynthesisFailed(r) if r.contains("voice-unavailable"))
    );
}

#[test]
fn playback_failure_without_a_handler_is_only_logged() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge.speak("hello", &SpeechOptions::default()).unwrap();
    backend.fail_playback("voice-unavailable");

    assert!(!bridge.is_speaking());
}

#[test]
fn malformed_options_never_reach_the_backend() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    let result = bridge.speak("hello", &SpeechOptions::default().with_rate(42.0));
    assert!(matches!(result, Err(VoiceError::SynthesisFailed(_))));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn selected_voice_is_used_when_options_name_none() {
    let backend = RecordingBackend::new(vec![us_english(), uk_english()]);
    let bridge = bridge(&backend);
    bridge
        .directory()
        .select_voice(&VoiceCriteria::language("en-GB"))
        .await
        .unwrap();

    bridge.speak("cheerio", &SpeechOptions::default()).unwrap();
    bridge
        .speak("howdy", &SpeechOptions::default().with_voice(us_english()))
        .unwrap();

    let spoken = backend.spoken();
    assert_eq!(spoken[0].voice, Some(uk_english()));
    assert_eq!(spoken[1].voice, Some(us_english()));
}

#[test]
fn no_selection_means_backend_default_voice() {
    let backend = RecordingBackend::new(Vec::new());
    let bridge = bridge(&backend);

    bridge.speak("hello", &SpeechOptions::default()).unwrap();
    assert_eq!(backend.spoken()[0].voice, None);
}

#[tokio::test]
async fn preload_warms_the_voice_list() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge.preload_voices().await.unwrap();
    assert!(backend.calls().is_empty());
}

#[test]
fn explicit_cancel_reaches_the_backend() {
    let backend = RecordingBackend::new(vec![us_english()]);
    let bridge = bridge(&backend);

    bridge.speak("long story", &SpeechOptions::default()).unwrap();
    assert!(bridge.is_speaking());
    bridge.cancel();

    assert!(!bridge.is_speaking());
    assert_eq!(backend.calls().last(), Some(&Call::Cancel));
}
