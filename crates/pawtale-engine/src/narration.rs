//! Text-to-speech narration with a content-addressed audio cache and
//! background jobs keyed by (session, event).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use pawtale_core::{EventId, EventOption, SessionId};
use pawtale_llm::{LlmProvider, SpeechProvider};

use crate::error::NarrationError;
use crate::generator::prompts;

pub const VOICES: [&str; 7] = ["alloy", "echo", "fable", "onyx", "nova", "shimmer", "sage"];
pub const DEFAULT_VOICE: &str = "sage";
pub const MAX_SPEECH_CHARS: usize = 4096;

/// URL prefix under which cached audio is served.
pub const AUDIO_URL_PREFIX: &str = "/audio";

#[derive(Clone, Debug)]
pub struct NarrationConfig {
    pub audio_dir: PathBuf,
    pub default_voice: String,
    pub max_chars: usize,
    pub wait_timeout: Duration,
}

impl NarrationConfig {
    pub fn new(audio_dir: impl Into<PathBuf>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            default_voice: DEFAULT_VOICE.to_string(),
            max_chars: MAX_SPEECH_CHARS,
            wait_timeout: Duration::from_secs(60),
        }
    }
}

/// A synthesized audio file in the cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AudioHandle {
    pub key: String,
    pub file_name: String,
    pub url: String,
    #[serde(skip)]
    pub path: PathBuf,
}

impl AudioHandle {
    fn for_key(audio_dir: &Path, key: String) -> Self {
        let file_name = format!("{key}.mp3");
        Self {
            path: audio_dir.join(&file_name),
            url: format!("{AUDIO_URL_PREFIX}/{file_name}"),
            file_name,
            key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrationStatus {
    InProgress,
    Complete { audio: AudioHandle },
    Failed { error: String },
}

impl NarrationStatus {
    pub fn is_finished(&self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// Known voice, or the configured default.
pub fn resolve_voice<'a>(requested: Option<&'a str>, default: &'a str) -> &'a str {
    match requested {
        Some(v) if VOICES.contains(&v) => v,
        Some(v) => {
            warn!(voice = v, fallback = default, "unknown voice");
            default
        }
        None => default,
    }
}

pub fn cache_key(text: &str, voice: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{text}_{voice}").as_bytes());
    format!("{:x}", hasher.finalize())
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Deterministic read-aloud text used when the text backend is unavailable.
pub fn fallback_speech_text(description: &str, pet_name: &str, options: &[EventOption]) -> String {
    let mut text = format!("{description}\n\nWhat should {pet_name} do next? ");
    for (i, option) in options.iter().enumerate() {
        text.push_str(&format!("\nOption {}: {}", i + 1, option.text));
    }
    text
}

pub fn job_key(session: &SessionId, event: Option<&EventId>) -> String {
    let event = event.map(EventId::as_str).unwrap_or("pending");
    format!("{session}:{event}")
}

/// Speech synthesis plus the audio cache.
#[derive(Clone)]
pub struct Narrator {
    speech: Arc<dyn SpeechProvider>,
    text: Option<Arc<dyn LlmProvider>>,
    config: Arc<NarrationConfig>,
}

impl Narrator {
    pub fn new(
        speech: Arc<dyn SpeechProvider>,
        text: Option<Arc<dyn LlmProvider>>,
        config: NarrationConfig,
    ) -> Self {
        Self {
            speech,
            text,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &NarrationConfig {
        &self.config
    }

    /// Audio for `text`, synthesizing only on a cache miss.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn speak(
        &self,
        text: &str,
        voice: Option<&str>,
    ) -> Result<AudioHandle, NarrationError> {
        let voice = resolve_voice(voice, &self.config.default_voice);
        let text = truncate_chars(text, self.config.max_chars);
        let handle = AudioHandle::for_key(&self.config.audio_dir, cache_key(text, voice));

        if tokio::fs::try_exists(&handle.path).await? {
            debug!(key = %handle.key, "narration cache hit");
            return Ok(handle);
        }

        let audio = self.speech.synthesize(text, voice).await?;
        tokio::fs::create_dir_all(&self.config.audio_dir).await?;
        pawtale_store::write_atomic(&handle.path, &audio).await?;
        info!(key = %handle.key, bytes = audio.len(), voice, "narration synthesized");
        Ok(handle)
    }

    /// Rewrites an event into read-aloud prose.
    pub async fn format_for_speech(
        &self,
        description: &str,
        pet_name: &str,
        options: &[EventOption],
    ) -> String {
        let Some(text) = &self.text else {
            return fallback_speech_text(description, pet_name, options);
        };
        match text
            .complete_text(&prompts::speech_prompt(description, pet_name, options))
            .await
        {
            Ok(formatted) if !formatted.trim().is_empty() => formatted.trim().to_string(),
            Ok(_) => fallback_speech_text(description, pet_name, options),
            Err(e) => {
                warn!(error = %e, "speech formatting failed, using plain text");
                fallback_speech_text(description, pet_name, options)
            }
        }
    }
}

/// Request to narrate one event.
#[derive(Clone, Debug)]
pub struct NarrationRequest {
    pub description: String,
    pub pet_name: String,
    pub options: Vec<EventOption>,
    pub voice: Option<String>,
}

/// Background narration jobs. Each job publishes its progress on a watch
/// channel; callers either read the latest value or wait for completion.
pub struct NarrationService {
    narrator: Narrator,
    jobs: Arc<DashMap<String, watch::Receiver<NarrationStatus>>>,
}

impl NarrationService {
    pub fn new(narrator: Narrator) -> Self {
        Self {
            narrator,
            jobs: Arc::new(DashMap::new()),
        }
    }

    /// Starts narrating unless a job for `key` is running or already done.
    /// Failed jobs are restarted.
    pub fn start(&self, key: &str, request: NarrationRequest) -> NarrationStatus {
        let tx = match self.jobs.entry(key.to_string()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get().borrow().clone();
                if !matches!(current, NarrationStatus::Failed { .. }) {
                    return current;
                }
                let (tx, rx) = watch::channel(NarrationStatus::InProgress);
                slot.insert(rx);
                tx
            }
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(NarrationStatus::InProgress);
                slot.insert(rx);
                tx
            }
        };

        let narrator = self.narrator.clone();
        let job = key.to_string();
        tokio::spawn(async move {
            let text = narrator
                .format_for_speech(&request.description, &request.pet_name, &request.options)
                .await;
            let status = match narrator.speak(&text, request.voice.as_deref()).await {
                Ok(audio) => NarrationStatus::Complete { audio },
                Err(e) => {
                    warn!(job = %job, error = %e, "narration failed");
                    NarrationStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            tx.send_replace(status);
        });

        NarrationStatus::InProgress
    }

    pub fn status(&self, key: &str) -> Option<NarrationStatus> {
        self.jobs.get(key).map(|rx| rx.borrow().clone())
    }

    /// Waits up to the configured timeout for the job to finish. A timeout is
    /// reported as failed; the job itself keeps running.
    pub async fn wait(&self, key: &str) -> Option<NarrationStatus> {
        let mut rx = self.jobs.get(key).map(|rx| rx.clone())?;
        let timeout = self.narrator.config.wait_timeout;
        let finished = match tokio::time::timeout(timeout, rx.wait_for(NarrationStatus::is_finished))
            .await
        {
            Ok(Ok(done)) => Some(done.clone()),
            Ok(Err(_)) => None,
            Err(_) => {
                return Some(NarrationStatus::Failed {
                    error: format!("narration not ready after {}s", timeout.as_secs()),
                })
            }
        };
        Some(finished.unwrap_or_else(|| rx.borrow().clone()))
    }

    /// Drops a single job, typically once its event has been resolved. A
    /// running task finishes on its own and still fills the audio cache.
    pub fn forget(&self, key: &str) {
        self.jobs.remove(key);
    }

    #[cfg(test)]
    pub(crate) fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Drops job bookkeeping for a session.
    pub fn forget_session(&self, session: &SessionId) {
        let prefix = format!("{session}:");
        self.jobs.retain(|k, _| !k.starts_with(&prefix));
    }
}
