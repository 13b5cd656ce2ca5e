//! Effective speech options for a single response.
//!
//! Three layers are combined field by field, lowest priority first:
//! the session's base options, the triggering command's options, and the
//! current mood preset. A field the mood preset sets always wins, even over
//! a value the command asked for explicitly.

use hark_types::SpeechOptions;

pub fn resolve(
    base: &SpeechOptions,
    per_command: Option<&SpeechOptions>,
    mood: Option<&SpeechOptions>,
) -> SpeechOptions {
    let mut effective = base.clone();
    if let Some(per_command) = per_command {
        effective = effective.overlay(per_command);
    }
    if let Some(mood) = mood {
        effective = effective.overlay(mood);
    }
    effective
}
