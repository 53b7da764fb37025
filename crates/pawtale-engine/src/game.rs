//! Session orchestration: every player operation loads the snapshot, applies
//! the stat model and trigger policy, talks to the generator and saves.
//!
//! A snapshot whose save failed stays in memory and wins over the stored
//! record until a later save of that session succeeds.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, instrument, warn};

use pawtale_core::{
    Action, Effect, Event, PetIdentity, ReadingLevel, SessionId, SessionSnapshot, Species,
    TriggerConfig, TriggerPolicy,
};
use pawtale_store::SessionStore;

use crate::error::GameError;
use crate::generator::{self, EventGenerator};
use crate::illustration::Illustrator;
use crate::lock::SessionLocks;
use crate::narration::{job_key, NarrationRequest, NarrationService, NarrationStatus};

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub trigger: TriggerConfig,
    /// History length above which the oldest entries are summarized.
    pub summary_threshold: usize,
    /// Live history cap used when summarizing fails.
    pub history_cap: usize,
    /// Regenerate the title after every this many resolved choices.
    pub title_every: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            trigger: TriggerConfig::default(),
            summary_threshold: 10,
            history_cap: 15,
            title_every: 3,
        }
    }
}

/// Result of one player operation.
#[derive(Clone, Debug)]
pub struct TurnOutcome {
    pub snapshot: SessionSnapshot,
    /// Stat deltas requested by the operation, before clamping.
    pub effect: Effect,
    /// Player-facing message about something that went wrong but did not
    /// stop the game.
    pub notice: Option<String>,
    /// False when the operation was a no-op and nothing was written.
    pub changed: bool,
    /// Whether the returned state is durable on disk.
    pub saved: bool,
    pub save_error: Option<String>,
    pub event_triggered: bool,
}

impl TurnOutcome {
    fn new(snapshot: SessionSnapshot, changed: bool, saved: bool) -> Self {
        Self {
            snapshot,
            effect: Effect::NONE,
            notice: None,
            changed,
            saved,
            save_error: None,
            event_triggered: false,
        }
    }
}

pub struct PetGame {
    store: SessionStore,
    generator: EventGenerator,
    illustrator: Option<Illustrator>,
    narration: Option<Arc<NarrationService>>,
    policy: TriggerPolicy,
    config: GameConfig,
    locks: SessionLocks,
    unsaved: DashMap<SessionId, SessionSnapshot>,
    rng: Mutex<StdRng>,
}

impl PetGame {
    pub fn new(store: SessionStore, generator: EventGenerator, config: GameConfig) -> Self {
        Self {
            store,
            generator,
            illustrator: None,
            narration: None,
            policy: TriggerPolicy::new(config.trigger.clone()),
            config,
            locks: SessionLocks::new(),
            unsaved: DashMap::new(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn with_illustrator(mut self, illustrator: Illustrator) -> Self {
        self.illustrator = Some(illustrator);
        self
    }

    pub fn with_narration(mut self, narration: NarrationService) -> Self {
        self.narration = Some(Arc::new(narration));
        self
    }

    /// Fixes the random source, for reproducible runs.
    pub fn with_seed(self, seed: u64) -> Self {
        *self.rng.lock() = StdRng::seed_from_u64(seed);
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn narration_enabled(&self) -> bool {
        self.narration.is_some()
    }

    pub fn new_session(&self) -> SessionId {
        SessionId::new()
    }

    pub fn suggest_name(&self, species: Species) -> &'static str {
        species.suggest_name(&mut *self.rng.lock())
    }

    pub async fn view(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, GameError> {
        if let Some(snap) = self.unsaved.get(id) {
            return Ok(Some(snap.clone()));
        }
        Ok(self.store.load(id).await?)
    }

    /// Creates the pet and opens its story.
    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn setup(
        &self,
        id: &SessionId,
        name: &str,
        species: &str,
        young_reader: bool,
    ) -> Result<TurnOutcome, GameError> {
        let species: Species = species.parse()?;
        let identity = PetIdentity::new(name, species)?;

        let _guard = self.locks.acquire(id).await;
        if self.view(id).await?.is_some() {
            return Err(GameError::AlreadySetUp(id.clone()));
        }

        let mut snap = SessionSnapshot::new(identity, ReadingLevel::from_young_reader(young_reader));
        let mut outcome_notice = None;

        let starter = {
            let mut rng = self.rng.lock();
            generator::random_starter(&mut *rng)
        };
        let mut event = match self
            .generator
            .generate_initial_story(&snap.stats, &snap.identity, snap.reading_level, &starter)
            .await
        {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "opening story failed, using fallback");
                outcome_notice = Some(format!(
                    "The storyteller is resting, so {} starts with a quiet day out.",
                    snap.identity.name()
                ));
                generator::fallback_story(&snap.identity)
            }
        };
        self.illustrate(&snap, &mut event).await;
        snap.title = Some(self.next_title(&snap.identity, Some(&event), None).await);
        snap.pending_event = Some(event);

        info!(pet = snap.identity.name(), species = %species.key(), "pet set up");
        let mut outcome = self.persist(id, snap).await;
        outcome.notice = outcome_notice;
        outcome.event_triggered = true;
        Ok(outcome)
    }

    /// Applies a care action and gives the trigger policy a chance to open
    /// a new event. A pending event is left untouched.
    #[instrument(skip_all, fields(session_id = %id, action = %action))]
    pub async fn act(&self, id: &SessionId, action: Action) -> Result<TurnOutcome, GameError> {
        let _guard = self.locks.acquire(id).await;
        let mut snap = self.load_existing(id).await?;

        snap.stats = snap.stats.apply_action(action);
        let name = snap.identity.name().to_string();
        snap.history.record_action(&name, action);

        let mut notice = None;
        let mut triggered = false;
        if snap.pending_event.is_none() {
            let (fire, cooldown) = {
                let mut rng = self.rng.lock();
                self.policy
                    .should_trigger(&snap.stats, snap.event_cooldown, &mut *rng)
            };
            snap.event_cooldown = cooldown;
            if fire {
                match self
                    .generator
                    .generate(
                        &snap.stats,
                        &snap.identity,
                        &snap.history,
                        &snap.summaries,
                        snap.reading_level,
                    )
                    .await
                {
                    Ok(mut event) => {
                        self.illustrate(&snap, &mut event).await;
                        info!(title = %event.title, "event triggered");
                        snap.pending_event = Some(event);
                        triggered = true;
                    }
                    Err(e) => {
                        warn!(error = %e, "event generation failed");
                        notice = Some(format!(
                            "Something was about to happen to {name}, but the story could not be told this time."
                        ));
                    }
                }
            }
        }

        self.fold_history(&mut snap).await;
        if snap.title.is_none() {
            snap.title = Some(
                self.next_title(&snap.identity, snap.pending_event.as_ref(), None)
                    .await,
            );
        }

        let mut outcome = self.persist(id, snap).await;
        outcome.effect = action.effect();
        outcome.notice = notice;
        outcome.event_triggered = triggered;
        Ok(outcome)
    }

    /// Resolves the pending event with the chosen option. Without a pending
    /// event, or with an index out of range, nothing changes.
    #[instrument(skip_all, fields(session_id = %id, index = index))]
    pub async fn choose(&self, id: &SessionId, index: usize) -> Result<TurnOutcome, GameError> {
        let _guard = self.locks.acquire(id).await;
        let mut snap = self.load_existing(id).await?;

        let durable = !self.unsaved.contains_key(id);
        let Some(event) = snap.pending_event.take() else {
            return Ok(TurnOutcome::new(snap, false, durable));
        };
        let Some(chosen) = event.options.get(index).cloned() else {
            warn!(options = event.options.len(), "choice index out of range");
            snap.pending_event = Some(event);
            return Ok(TurnOutcome::new(snap, false, durable));
        };
        if let Some(narration) = &self.narration {
            narration.forget(&job_key(id, event.id.as_ref()));
        }

        let effect = chosen.effect;
        snap.stats = snap.stats.apply_effects(&effect);
        snap.history.record_choice(&event, &chosen);
        snap.event_counter += 1;

        if snap.title.is_none() || snap.event_counter % self.config.title_every == 0 {
            let current = snap.title.take();
            snap.title = Some(self.next_title(&snap.identity, Some(&event), current).await);
        }
        self.fold_history(&mut snap).await;

        let mut outcome = self.persist(id, snap).await;
        outcome.effect = effect;
        Ok(outcome)
    }

    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn set_reading_level(
        &self,
        id: &SessionId,
        young_reader: bool,
    ) -> Result<TurnOutcome, GameError> {
        let _guard = self.locks.acquire(id).await;
        let mut snap = self.load_existing(id).await?;
        snap.reading_level = ReadingLevel::from_young_reader(young_reader);
        Ok(self.persist(id, snap).await)
    }

    /// Deletes the session. Resetting an unknown session succeeds.
    #[instrument(skip_all, fields(session_id = %id))]
    pub async fn reset(&self, id: &SessionId) -> Result<(), GameError> {
        let _guard = self.locks.acquire(id).await;
        self.store.reset(id).await?;
        self.unsaved.remove(id);
        if let Some(narration) = &self.narration {
            narration.forget_session(id);
        }
        info!("session reset");
        Ok(())
    }

    /// Starts narrating the pending event in the background.
    pub async fn start_narration(
        &self,
        id: &SessionId,
        voice: Option<String>,
    ) -> Result<NarrationStatus, GameError> {
        let narration = self.narration.as_ref().ok_or(GameError::NarrationDisabled)?;
        let snap = self.load_existing(id).await?;
        let event = snap.pending_event.as_ref().ok_or(GameError::NoPendingEvent)?;

        let request = NarrationRequest {
            description: event.description.clone(),
            pet_name: snap.identity.name().to_string(),
            options: event.options.clone(),
            voice,
        };
        Ok(narration.start(&job_key(id, event.id.as_ref()), request))
    }

    /// Narration status for the pending event, `None` when no narration was
    /// started for it. With `wait`, blocks until done or timed out.
    pub async fn narration_status(
        &self,
        id: &SessionId,
        wait: bool,
    ) -> Result<Option<NarrationStatus>, GameError> {
        let narration = self.narration.as_ref().ok_or(GameError::NarrationDisabled)?;
        let snap = self.load_existing(id).await?;
        let event = snap.pending_event.as_ref().ok_or(GameError::NoPendingEvent)?;
        let key = job_key(id, event.id.as_ref());
        if wait {
            Ok(narration.wait(&key).await)
        } else {
            Ok(narration.status(&key))
        }
    }

    async fn load_existing(&self, id: &SessionId) -> Result<SessionSnapshot, GameError> {
        self.view(id)
            .await?
            .ok_or_else(|| GameError::SessionNotFound(id.clone()))
    }

    async fn persist(&self, id: &SessionId, snapshot: SessionSnapshot) -> TurnOutcome {
        let mut outcome = TurnOutcome::new(snapshot, true, false);
        match self.store.save(id, &outcome.snapshot).await {
            Ok(_) => {
                self.unsaved.remove(id);
                outcome.saved = true;
            }
            Err(e) => {
                warn!(session_id = %id, error = %e, "failed to save session, keeping it in memory");
                self.unsaved.insert(id.clone(), outcome.snapshot.clone());
                outcome.save_error = Some(e.to_string());
            }
        }
        outcome
    }

    async fn illustrate(&self, snap: &SessionSnapshot, event: &mut Event) {
        if let Some(illustrator) = &self.illustrator {
            event.image_url = illustrator
                .generate_image(&snap.identity, snap.stats.mood(), &event.description)
                .await;
        }
    }

    /// A fresh title, or `current` (then the fallback) when generation fails.
    async fn next_title(
        &self,
        identity: &PetIdentity,
        event: Option<&Event>,
        current: Option<String>,
    ) -> String {
        match self.generator.generate_title(identity, event).await {
            Ok(title) => title,
            Err(e) => {
                warn!(error = %e, "title generation failed");
                current.unwrap_or_else(|| generator::fallback_title(identity))
            }
        }
    }

    async fn fold_history(&self, snap: &mut SessionSnapshot) {
        let threshold = self.config.summary_threshold;
        while snap.history.len() > threshold {
            let oldest = snap.history.oldest(threshold).to_vec();
            match self.generator.generate_summary(&snap.identity, &oldest).await {
                Ok(summary) => {
                    snap.summaries.push(summary);
                    snap.history.fold_oldest(threshold);
                }
                Err(e) => {
                    warn!(error = %e, "history summary failed, capping log");
                    snap.history.cap(self.config.history_cap);
                    break;
                }
            }
        }
    }
}
