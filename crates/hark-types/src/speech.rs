//! Speech synthesis and recognition settings.

use crate::voice::VoiceRef;
use serde::{Deserialize, Serialize};

/// Partial text-to-speech settings.
///
/// Every field is optional: an unset field falls through to whatever a
/// lower-priority layer supplies, and finally to the backend's default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpeechOptions {
    /// Loudness, 0.0 to 1.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    /// Speaking rate multiplier, 0.1 to 10.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    /// Pitch multiplier, 0.0 to 2.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<VoiceRef>,
}

impl SpeechOptions {
    pub const fn new(volume: f32, rate: f32, pitch: f32) -> Self {
        Self {
            volume: Some(volume),
            rate: Some(rate),
            pitch: Some(pitch),
            voice: None,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn with_pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn with_voice(mut self, voice: VoiceRef) -> Self {
        self.voice = Some(voice);
        self
    }

    /// Returns `true` when no field is set.
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.rate.is_none() && self.pitch.is_none() && self.voice.is_none()
    }

    /// Lays `top` over `self` field by field.
    ///
    /// Fields present in `top` replace those in `self`; fields absent from
    /// `top` leave `self` untouched.
    pub fn overlay(&self, top: &SpeechOptions) -> SpeechOptions {
        SpeechOptions {
            volume: top.volume.or(self.volume),
            rate: top.rate.or(self.rate),
            pitch: top.pitch.or(self.pitch),
            voice: top.voice.clone().or_else(|| self.voice.clone()),
        }
    }
}

fn default_lang() -> String {
    "en-US".to_string()
}

/// Settings for a recognition session.
///
/// Fixed once the session is configured; changing language means building a
/// new session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionOptions {
    #[serde(default = "default_lang")]
    pub lang: String,
    /// Keep listening after the first result.
    #[serde(default)]
    pub continuous: bool,
    /// Report partial transcripts while the speaker is still talking.
    #[serde(default)]
    pub interim_results: bool,
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            lang: default_lang(),
            continuous: false,
            interim_results: false,
        }
    }
}
