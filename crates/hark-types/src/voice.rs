//! Voice descriptors and selection criteria.
//!
//! A `VoiceRef` is whatever the synthesis backend reports when asked for its
//! voice list. A `VoiceCriteria` is the query used to pick one of them.

use serde::{Deserialize, Serialize};

/// A voice the synthesis backend can speak with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceRef {
    /// Human-readable voice name (e.g. "Google US English").
    pub name: String,
    /// BCP-47 language tag (e.g. "en-US").
    pub lang: String,
    /// Backend-specific identifier for the voice.
    pub voice_uri: String,
    /// Whether the voice is rendered locally rather than by a remote service.
    #[serde(default)]
    pub local_service: bool,
    /// Whether the backend marks this voice as its default.
    #[serde(default)]
    pub default: bool,
}

impl VoiceRef {
    pub fn new(
        name: impl Into<String>,
        lang: impl Into<String>,
        voice_uri: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            lang: lang.into(),
            voice_uri: voice_uri.into(),
            local_service: true,
            default: false,
        }
    }
}

/// Query for selecting a voice.
///
/// `language` must match exactly. `name` and `voice_uri` are wildcards when
/// omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceCriteria {
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_uri: Option<String>,
}

impl VoiceCriteria {
    pub fn language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            name: None,
            voice_uri: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_voice_uri(mut self, voice_uri: impl Into<String>) -> Self {
        self.voice_uri = Some(voice_uri.into());
        self
    }

    /// Returns `true` if `voice` satisfies every supplied criterion.
    pub fn matches(&self, voice: &VoiceRef) -> bool {
        voice.lang == self.language
            && self.name.as_deref().map_or(true, |n| voice.name == n)
            && self.voice_uri.as_deref().map_or(true, |u| voice.voice_uri == u)
    }
}
