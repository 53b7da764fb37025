//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PawtaleSettings::default()`]
//! 2. If the settings file exists, deep-merge its values over the defaults
//! 3. Apply `PAWTALE_*` environment overrides (highest priority)
//! 4. Validate

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::PawtaleSettings;

/// Environment variable holding the backend API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// `~/.pawtale`, or `/tmp/.pawtale` when `HOME` is unset.
pub fn pawtale_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".pawtale")
}

pub fn settings_path() -> PathBuf {
    pawtale_home().join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<PawtaleSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON is an error.
pub fn load_settings_from_path(path: &Path) -> Result<PawtaleSettings> {
    let mut settings = read_layered(path)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

fn read_layered(path: &Path) -> Result<PawtaleSettings> {
    let defaults = serde_json::to_value(PawtaleSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Recursive deep merge of two JSON values.
///
/// Objects merge per key, arrays and primitives are replaced, and nulls in
/// `source` leave `target` untouched.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = match target_map.remove(&key) {
                    Some(target_val) => deep_merge(target_val, source_val),
                    None => source_val,
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply `PAWTALE_*` overrides from the process environment.
pub fn apply_env_overrides(settings: &mut PawtaleSettings) {
    apply_overrides_with(settings, |name| std::env::var(name).ok());
}

/// Apply overrides using `lookup` as the variable source.
///
/// Unparsable or out-of-range values are logged and ignored.
pub fn apply_overrides_with<F>(settings: &mut PawtaleSettings, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    // ── Server ──────────────────────────────────────────────────────
    if let Some(v) = env.string("PAWTALE_HOST") {
        settings.server.host = v;
    }
    if let Some(v) = env.u16("PAWTALE_PORT", 1, 65535) {
        settings.server.port = v;
    }

    // ── Storage ─────────────────────────────────────────────────────
    if let Some(v) = env.string("PAWTALE_DATA_DIR") {
        settings.storage.data_dir = Some(v);
    }

    // ── LLM ─────────────────────────────────────────────────────────
    if let Some(v) = env.string("PAWTALE_BASE_URL") {
        settings.llm.base_url = v;
    }
    if let Some(v) = env.string("PAWTALE_MODEL") {
        settings.llm.model = v;
    }
    if let Some(v) = env.u64("PAWTALE_LLM_TIMEOUT_SECS", 1, 600) {
        settings.llm.timeout_secs = v;
    }

    // ── Speech / image ──────────────────────────────────────────────
    if let Some(v) = env.bool("PAWTALE_SPEECH_ENABLED") {
        settings.speech.enabled = v;
    }
    if let Some(v) = env.string("PAWTALE_VOICE") {
        settings.speech.default_voice = v;
    }
    if let Some(v) = env.bool("PAWTALE_IMAGES_ENABLED") {
        settings.image.enabled = v;
    }

    // ── Telemetry ───────────────────────────────────────────────────
    if let Some(v) = env.string("PAWTALE_LOG_LEVEL") {
        settings.telemetry.level = v;
    }
    if let Some(v) = env.bool("PAWTALE_LOG_JSON") {
        settings.telemetry.json = v;
    }
}

/// The backend API key, if one is configured in the environment.
pub fn api_key_from_env() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(SecretString::from)
}

// ── Pure parsing functions ──────────────────────────────────────────────────

/// Accepts (case-insensitive) `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn parse_u16_range(val: &str, min: u16, max: u16) -> Option<u16> {
    let n: u16 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, name: &str) -> Option<String> {
        (self.lookup)(name).filter(|v| !v.is_empty())
    }

    fn bool(&self, name: &str) -> Option<bool> {
        let val = (self.lookup)(name)?;
        let result = parse_bool(&val);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid boolean env var, ignoring");
        }
        result
    }

    fn u16(&self, name: &str, min: u16, max: u16) -> Option<u16> {
        let val = (self.lookup)(name)?;
        let result = parse_u16_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u16 env var, ignoring");
        }
        result
    }

    fn u64(&self, name: &str, min: u64, max: u64) -> Option<u64> {
        let val = (self.lookup)(name)?;
        let result = parse_u64_range(&val, min, max);
        if result.is_none() {
            tracing::warn!(key = name, value = %val, "invalid u64 env var, ignoring");
        }
        result
    }
}
