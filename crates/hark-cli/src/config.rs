//! Configuration loading from file and environment variables.

use hark_types::Mood;
use hark_voice::espeak::DEFAULT_ESPEAK_BINARY;
use hark_voice::VoiceConfig;
use serde::Deserialize;
use thiserror::Error;

/// Top-level configuration for the `hark` binary.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Recognition, speech, mood and voice settings for the orchestrator.
    #[serde(default)]
    pub voice: VoiceConfig,

    #[serde(default)]
    pub espeak: EspeakConfig,

    /// Commands to register at start-up.
    #[serde(default)]
    pub commands: Vec<CommandConfig>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "hark_voice=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EspeakConfig {
    /// Path or name of the `espeak-ng` executable.
    #[serde(default = "default_espeak_binary")]
    pub binary: String,
}

/// A command declared in the configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandConfig {
    pub phrase: String,
    pub reply: String,
    #[serde(default = "default_speak")]
    pub speak: bool,
    #[serde(default)]
    pub volume: Option<f32>,
    #[serde(default)]
    pub rate: Option<f32>,
    #[serde(default)]
    pub pitch: Option<f32>,
    /// Mood to switch to when the command fires.
    #[serde(default)]
    pub mood: Option<Mood>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_espeak_binary() -> String {
    DEFAULT_ESPEAK_BINARY.to_string()
}

fn default_speak() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl Default for EspeakConfig {
    fn default() -> Self {
        Self {
            binary: default_espeak_binary(),
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides:
/// - `HARK_LOG_LEVEL` overrides `logging.level`
/// - `HARK_LOG_JSON` overrides `logging.json` (set to "true" to enable)
/// - `HARK_LANG` overrides `voice.recognition.lang`
/// - `HARK_MOOD` overrides `voice.mood`
/// - `HARK_DISCOVERY_TIMEOUT_MS` overrides `voice.discovery_timeout_ms`
/// - `HARK_ESPEAK_BINARY` overrides `espeak.binary`
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

/// Applies `HARK_*` overrides read through `lookup`.
///
/// Unparseable values are ignored.
pub fn apply_env_overrides(mut config: Config, lookup: impl Fn(&str) -> Option<String>) -> Config {
    if let Some(level) = lookup("HARK_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = lookup("HARK_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }
    if let Some(lang) = lookup("HARK_LANG") {
        config.voice.recognition.lang = lang;
    }
    if let Some(mood) = lookup("HARK_MOOD") {
        match mood.parse::<Mood>() {
            Ok(parsed) => config.voice.mood = Some(parsed),
            Err(e) => tracing::warn!(error = %e, "ignoring HARK_MOOD"),
        }
    }
    if let Some(timeout) = lookup("HARK_DISCOVERY_TIMEOUT_MS") {
        if let Ok(parsed) = timeout.parse() {
            config.voice.discovery_timeout_ms = parsed;
        }
    }
    if let Some(binary) = lookup("HARK_ESPEAK_BINARY") {
        config.espeak.binary = binary;
    }
    config
}
