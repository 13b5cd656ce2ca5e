//! Turns `[[commands]]` entries into registry commands.

use crate::config::CommandConfig;
use hark_types::SpeechOptions;
use hark_voice::{Command, CommandResponse, Orchestrator};
use std::sync::{Arc, Weak};

/// Builds one [`Command`] per configured entry.
///
/// Commands that carry a `mood` switch the orchestrator into it; the new
/// mood applies from the next dispatch.
pub fn build_commands(entries: &[CommandConfig], orchestrator: &Arc<Orchestrator>) -> Vec<Command> {
    entries
        .iter()
        .map(|entry| build_command(entry, Arc::downgrade(orchestrator)))
        .collect()
}

fn build_command(entry: &CommandConfig, orchestrator: Weak<Orchestrator>) -> Command {
    let reply = entry.reply.clone();
    let speak = entry.speak;
    let mood = entry.mood;
    let options = SpeechOptions {
        volume: entry.volume,
        rate: entry.rate,
        pitch: entry.pitch,
        voice: None,
    };

    Command::new(entry.phrase.clone(), move || {
        if let Some(mood) = mood {
            if let Some(orchestrator) = orchestrator.upgrade() {
                orchestrator.set_mood(mood);
            }
        }

        let mut response = CommandResponse::new(reply.clone());
        response.speak = speak;
        if !options.is_empty() {
            response = response.with_options(options.clone());
        }
        response
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleSession;
    use hark_types::Mood;
    use hark_voice::{EspeakBackend, Hooks, SynthesisBackend, VoiceConfig};
    use tokio::io::BufReader;

    fn orchestrator() -> Arc<Orchestrator> {
        let synthesis: Arc<dyn SynthesisBackend> =
            Arc::new(EspeakBackend::new("/nonexistent/espeak-ng"));
        Orchestrator::new(
            Some(Box::new(ConsoleSession::from_reader(BufReader::new(
                tokio::io::empty(),
            )))),
            Some(synthesis),
            VoiceConfig::default(),
            Hooks::default(),
        )
        .unwrap()
    }

    fn entry(phrase: &str, reply: &str) -> CommandConfig {
        CommandConfig {
            phrase: phrase.to_string(),
            reply: reply.to_string(),
            speak: true,
            volume: None,
            rate: None,
            pitch: None,
            mood: None,
        }
    }

    #[test]
    fn reply_is_spoken_without_options_by_default() {
        let orchestrator = orchestrator();
        let commands = build_commands(&[entry("hello", "hi there")], &orchestrator);

        assert_eq!(commands.len(), 1);
        assert_eq!(commands[0].phrase, "hello");
        let response = (commands[0].action)().unwrap();
        assert_eq!(response.text, "hi there");
        assert!(response.speak);
        assert!(response.options.is_none());
    }

    #[test]
    fn partial_options_are_carried() {
        let orchestrator = orchestrator();
        let mut quiet = entry("whisper", "psst");
        quiet.volume = Some(0.2);
        quiet.speak = false;

        let commands = build_commands(&[quiet], &orchestrator);
        let response = (commands[0].action)().unwrap();

        assert!(!response.speak);
        let options = response.options.unwrap();
        assert_eq!(options.volume, Some(0.2));
        assert_eq!(options.rate, None);
        assert_eq!(options.pitch, None);
    }

    #[test]
    fn mood_entry_switches_mood() {
        let orchestrator = orchestrator();
        let mut cheer = entry("cheer up", "yay");
        cheer.mood = Some(Mood::Happy);

        let commands = build_commands(&[cheer], &orchestrator);
        assert_eq!(orchestrator.mood(), None);
        (commands[0].action)();
        assert_eq!(orchestrator.mood(), Some(Mood::Happy));
    }

    #[test]
    fn dropped_orchestrator_leaves_reply_intact() {
        let orchestrator = orchestrator();
        let mut cheer = entry("cheer up", "yay");
        cheer.mood = Some(Mood::Happy);
        let commands = build_commands(&[cheer], &orchestrator);
        drop(orchestrator);

        let response = (commands[0].action)().unwrap();
        assert_eq!(response.text, "yay");
    }
}
