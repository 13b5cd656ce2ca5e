//! The `hark` console front end: typed phrases drive the voice orchestrator
//! and replies are spoken through `espeak-ng`.

pub mod commands;
pub mod config;
pub mod console;

use crate::config::{CommandConfig, Config};
use crate::console::ConsoleSession;
use hark_voice::{
    EspeakBackend, Hooks, Orchestrator, SynthesisBackend, VoiceConfig, VoiceError, VoiceResult,
};
use std::future::Future;
use std::sync::{Arc, OnceLock, Weak};
use tracing::{info, warn};

type OrchestratorSlot = Arc<OnceLock<Weak<Orchestrator>>>;

/// Runs the orchestrator until `shutdown` resolves.
///
/// # Errors
///
/// Fails when a capability is missing or listening cannot start.
pub async fn run(config: Config, shutdown: impl Future<Output = ()>) -> VoiceResult<()> {
    let synthesis = EspeakBackend::detect(&config.espeak.binary)
        .await
        .map(|backend| Arc::new(backend) as Arc<dyn SynthesisBackend>);

    let criteria = config.voice.voice.clone();
    let orchestrator = assemble(
        config.voice,
        &config.commands,
        ConsoleSession::stdin(),
        synthesis,
    )?;

    if let Some(criteria) = criteria {
        if let Err(e) = orchestrator.set_voice(&criteria).await {
            warn!(error = %e, "voice selection failed, using the engine default");
        }
    }

    orchestrator.start_listening()?;
    info!(
        commands = orchestrator.command_count(),
        "listening, type a phrase and press enter"
    );

    shutdown.await;

    orchestrator.cancel_speech();
    orchestrator.stop_listening()?;
    Ok(())
}

/// Builds an orchestrator over `session` with the configured commands.
///
/// A single-shot session (`continuous = false`) is restarted after every
/// phrase, so the console keeps accepting input.
pub fn assemble(
    voice: VoiceConfig,
    commands: &[CommandConfig],
    session: ConsoleSession,
    synthesis: Option<Arc<dyn SynthesisBackend>>,
) -> VoiceResult<Arc<Orchestrator>> {
    let slot: OrchestratorSlot = Arc::default();
    let single_shot = !voice.recognition.continuous;

    let hooks = Hooks::default()
        .on_command_recognized({
            let slot = Arc::clone(&slot);
            move |phrase: &str| {
                info!(phrase, "command handled");
                if single_shot {
                    listen_again(&slot);
                }
            }
        })
        .on_command_unrecognized({
            let slot = Arc::clone(&slot);
            move |phrase: &str| {
                info!(phrase, "no command matches");
                if single_shot {
                    listen_again(&slot);
                }
            }
        })
        .on_error(|err: &VoiceError| warn!(error = %err, "voice error"));

    let orchestrator = Orchestrator::new(Some(Box::new(session)), synthesis, voice, hooks)?;
    let _ = slot.set(Arc::downgrade(&orchestrator));
    orchestrator.register_commands(commands::build_commands(commands, &orchestrator));
    Ok(orchestrator)
}

fn listen_again(slot: &OnceLock<Weak<Orchestrator>>) {
    let Some(orchestrator) = slot.get().and_then(Weak::upgrade) else {
        return;
    };
    if let Err(e) = orchestrator.start_listening() {
        warn!(error = %e, "could not resume listening");
    }
}
