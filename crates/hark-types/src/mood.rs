//! Moods and their speech presets.
//!
//! A mood is an ambient persona applied on top of every response the
//! orchestrator speaks. The set of moods is closed; each has a built-in
//! preset, and a `MoodSettings` table can replace individual presets.

use crate::speech::SpeechOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Sad,
    Angry,
    Surprised,
    Neutral,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Sad,
        Mood::Angry,
        Mood::Surprised,
        Mood::Neutral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Calm => "calm",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::Surprised => "surprised",
            Self::Neutral => "neutral",
        }
    }

    /// The built-in preset for this mood.
    pub const fn default_preset(self) -> SpeechOptions {
        match self {
            // Brighter and a touch quicker.
            Self::Happy => SpeechOptions::new(1.0, 1.2, 1.5),
            Self::Calm => SpeechOptions::new(0.8, 0.9, 1.0),
            Self::Sad => SpeechOptions::new(0.7, 0.8, 0.8),
            Self::Angry => SpeechOptions::new(1.0, 1.1, 1.3),
            Self::Surprised => SpeechOptions::new(1.0, 1.2, 1.4),
            Self::Neutral => SpeechOptions::new(1.0, 1.0, 1.0),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Mood {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "happy" => Ok(Self::Happy),
            "calm" => Ok(Self::Calm),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "surprised" => Ok(Self::Surprised),
            "neutral" => Ok(Self::Neutral),
            _ => Err(ParseMoodError(s.to_string())),
        }
    }
}

/// Error returned when parsing a mood name outside the known set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood: {0}")]
pub struct ParseMoodError(pub String);

/// Per-instance mood presets.
///
/// Only overridden moods are stored; every other mood resolves to its
/// built-in preset, which is never mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodSettings {
    overrides: HashMap<Mood, SpeechOptions>,
}

impl MoodSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the preset used for `mood`.
    pub fn with_preset(mut self, mood: Mood, preset: SpeechOptions) -> Self {
        self.overrides.insert(mood, preset);
        self
    }

    /// The preset in effect for `mood`.
    pub fn preset(&self, mood: Mood) -> SpeechOptions {
        self.overrides
            .get(&mood)
            .cloned()
            .unwrap_or_else(|| mood.default_preset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Happy".parse::<Mood>(), Ok(Mood::Happy));
        assert_eq!(" calm ".parse::<Mood>(), Ok(Mood::Calm));
        assert_eq!(
            "grumpy".parse::<Mood>(),
            Err(ParseMoodError("grumpy".to_string()))
        );
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for mood in Mood::ALL {
            assert_eq!(mood.to_string().parse::<Mood>(), Ok(mood));
        }
    }

    #[test]
    fn default_presets_are_fully_populated() {
        for mood in Mood::ALL {
            let preset = mood.default_preset();
            assert!(preset.volume.is_some() && preset.rate.is_some() && preset.pitch.is_some());
            assert!(preset.voice.is_none());
        }
        assert_eq!(Mood::Sad.default_preset(), SpeechOptions::new(0.7, 0.8, 0.8));
    }

    #[test]
    fn overrides_replace_only_their_mood() {
        let settings =
            MoodSettings::new().with_preset(Mood::Happy, SpeechOptions::default().with_volume(0.3));

        assert_eq!(settings.preset(Mood::Happy).volume, Some(0.3));
        assert_eq!(settings.preset(Mood::Happy).rate, None);
        assert_eq!(settings.preset(Mood::Calm), Mood::Calm.default_preset());
    }

    #[test]
    fn settings_deserialize_from_toml_table() {
        let settings: MoodSettings = toml::from_str(
            r#"
            [sad]
            volume = 0.5
            pitch = 0.6
            "#,
        )
        .unwrap();

        assert_eq!(settings.preset(Mood::Sad).volume, Some(0.5));
        assert_eq!(settings.preset(Mood::Sad).rate, None);
        assert_eq!(settings.preset(Mood::Angry), Mood::Angry.default_preset());
    }
}
