//! Settings type definitions.
//!
//! Field names are camelCase on the wire. Every section implements
//! [`Default`] with production values and is marked `#[serde(default)]`, so a
//! partial JSON file only needs the keys it changes.

use std::path::PathBuf;

use pawtale_core::TriggerConfig;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PawtaleSettings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub llm: LlmSettings,
    pub speech: SpeechSettings,
    pub image: ImageSettings,
    pub game: GameSettings,
    pub telemetry: TelemetrySettings,
}

impl PawtaleSettings {
    /// Reject values that parse but cannot work at runtime.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(SettingsError::InvalidValue(format!(
                "llm.temperature must be within 0..=2, got {}",
                self.llm.temperature
            )));
        }
        if self.llm.retry.max_attempts == 0 {
            return Err(SettingsError::InvalidValue(
                "llm.retry.maxAttempts must be at least 1".into(),
            ));
        }
        let trigger = &self.game.trigger;
        for (name, chance) in [
            ("normalChance", trigger.normal_chance),
            ("criticalChance", trigger.critical_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(SettingsError::InvalidValue(format!(
                    "game.trigger.{name} must be within 0..=1, got {chance}"
                )));
            }
        }
        if trigger.cooldown_min > trigger.cooldown_max {
            return Err(SettingsError::InvalidValue(
                "game.trigger.cooldownMin exceeds cooldownMax".into(),
            ));
        }
        if self.game.summary_threshold == 0 || self.game.title_every == 0 {
            return Err(SettingsError::InvalidValue(
                "game.summaryThreshold and game.titleEvery must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Upper bound on a single HTTP request, generation included.
    pub request_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            request_timeout_secs: 180,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageSettings {
    /// Root for session records and the narration cache.
    /// Defaults to `~/.pawtale/data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<String>,
}

impl StorageSettings {
    pub fn resolve_data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => crate::loader::pawtale_home().join("data"),
        }
    }

    pub fn sessions_dir(&self) -> PathBuf {
        self.resolve_data_dir().join("sessions")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.resolve_data_dir().join("audio")
    }

    /// Pet pictures served under `/static`, laid out as `pets/{species}/{mood}.png`.
    pub fn assets_dir(&self) -> PathBuf {
        self.resolve_data_dir().join("assets")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub retry: RetrySettings,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout_secs: 60,
            retry: RetrySettings::default(),
        }
    }
}

/// Backoff for transient backend failures.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetrySettings {
    /// Total attempts, the first call included.
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 10_000,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpeechSettings {
    pub enabled: bool,
    pub model: String,
    pub default_voice: String,
    pub max_chars: usize,
    /// How long `wait=true` status requests block.
    pub wait_timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "tts-1".to_string(),
            default_voice: "sage".to_string(),
            max_chars: 4096,
            wait_timeout_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageSettings {
    pub enabled: bool,
    pub model: String,
    pub size: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "dall-e-3".to_string(),
            size: "1024x1024".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameSettings {
    pub trigger: TriggerConfig,
    /// Live history length that triggers folding into a summary.
    pub summary_threshold: usize,
    /// Live history length kept when summarising fails.
    pub history_cap: usize,
    /// Regenerate the story title after this many resolved choices.
    pub title_every: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            summary_threshold: 10,
            history_cap: 15,
            title_every: 3,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TelemetrySettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    pub json: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_conventions() {
        let s = PawtaleSettings::default();
        assert_eq!(s.llm.model, "gpt-4o-mini");
        assert!((s.llm.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(s.llm.retry.max_attempts, 3);
        assert_eq!(s.llm.retry.base_delay_ms, 2_000);
        assert_eq!(s.llm.retry.max_delay_ms, 10_000);
        assert_eq!(s.speech.default_voice, "sage");
        assert_eq!(s.speech.max_chars, 4096);
        assert_eq!(s.game.summary_threshold, 10);
        assert_eq!(s.game.history_cap, 15);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn json_field_names_are_camel_case() {
        let json = serde_json::to_value(PawtaleSettings::default()).unwrap();
        assert!(json["llm"].get("baseUrl").is_some());
        assert!(json["llm"]["retry"].get("maxAttempts").is_some());
        assert!(json["game"]["trigger"].get("criticalChance").is_some());
        assert!(json["storage"].get("dataDir").is_none());
    }

    #[test]
    fn empty_json_produces_defaults() {
        let s: PawtaleSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(s.server.port, 8501);
        assert_eq!(s.game.trigger.cooldown_max, 5);
    }

    #[test]
    fn storage_paths_hang_off_data_dir() {
        let storage = StorageSettings {
            data_dir: Some("/srv/pawtale".into()),
        };
        assert_eq!(storage.sessions_dir(), PathBuf::from("/srv/pawtale/sessions"));
        assert_eq!(storage.audio_dir(), PathBuf::from("/srv/pawtale/audio"));
        assert_eq!(storage.assets_dir(), PathBuf::from("/srv/pawtale/assets"));
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut s = PawtaleSettings::default();
        s.llm.temperature = 3.5;
        assert!(matches!(s.validate(), Err(SettingsError::InvalidValue(_))));

        let mut s = PawtaleSettings::default();
        s.game.trigger.critical_chance = 1.5;
        assert!(s.validate().is_err());

        let mut s = PawtaleSettings::default();
        s.game.trigger.cooldown_min = 9;
        assert!(s.validate().is_err());

        let mut s = PawtaleSettings::default();
        s.llm.retry.max_attempts = 0;
        assert!(s.validate().is_err());
    }
}
