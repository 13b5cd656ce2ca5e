use hark_types::{Mood, MoodSettings, RecognitionOptions, SpeechOptions, VoiceCriteria};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How long voice discovery waits for the backend's "voices changed" signal.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_millis(7000);

fn default_discovery_timeout_ms() -> u64 {
    DEFAULT_DISCOVERY_TIMEOUT.as_millis() as u64
}

/// Core configuration for an [`Orchestrator`](crate::Orchestrator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceConfig {
    #[serde(default)]
    pub recognition: RecognitionOptions,
    /// Base text-to-speech options, the lowest layer of the merge.
    #[serde(default)]
    pub speech: SpeechOptions,
    /// Mood in effect at start-up.
    #[serde(default)]
    pub mood: Option<Mood>,
    /// Per-mood preset overrides.
    #[serde(default)]
    pub moods: MoodSettings,
    /// Voice to select once the backend's voice list is available.
    #[serde(default)]
    pub voice: Option<VoiceCriteria>,
    /// Bound on voice discovery, in milliseconds. Default: 7000.
    #[serde(default = "default_discovery_timeout_ms")]
    pub discovery_timeout_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            recognition: RecognitionOptions::default(),
            speech: SpeechOptions::default(),
            mood: None,
            moods: MoodSettings::default(),
            voice: None,
            discovery_timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

impl VoiceConfig {
    pub fn discovery_timeout(&self) -> Duration {
        Duration::from_millis(self.discovery_timeout_ms)
    }
}
