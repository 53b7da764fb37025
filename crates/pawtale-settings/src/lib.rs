//! # pawtale-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`PawtaleSettings::default()`]
//! 2. **User file**: `~/.pawtale/settings.json` or an explicit path
//! 3. **Environment variables**: `PAWTALE_*` overrides
//!
//! The backend API key never lives in the settings file; it is read from
//! `OPENAI_API_KEY` by [`api_key_from_env`].

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    api_key_from_env, apply_env_overrides, deep_merge, load_settings, load_settings_from_path,
    pawtale_home, settings_path, API_KEY_ENV,
};
pub use types::*;
