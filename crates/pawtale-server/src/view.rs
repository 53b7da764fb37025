//! JSON shapes the UI renders.

use serde::Serialize;

use pawtale_core::{Effect, Event, Mood, SessionId, SessionSnapshot, Species};
use pawtale_engine::TurnOutcome;

#[derive(Debug, Serialize)]
pub struct PetView {
    pub name: String,
    pub species: &'static str,
    pub species_name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct StatsView {
    pub hunger: u8,
    pub energy: u8,
    pub happiness: u8,
    pub mood: Mood,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub setup_complete: bool,
    pub pet: PetView,
    pub stats: StatsView,
    /// Catalog picture for the current mood.
    pub image_path: String,
    pub title: Option<String>,
    pub event: Option<Event>,
    pub history: Vec<String>,
    pub summaries: Vec<String>,
    pub event_counter: u32,
    pub young_reader: bool,
}

impl SessionView {
    pub fn new(id: &SessionId, snap: &SessionSnapshot) -> Self {
        let species = snap.identity.species();
        Self {
            session_id: id.to_string(),
            setup_complete: true,
            pet: PetView {
                name: snap.identity.name().to_string(),
                species: species.key(),
                species_name: species.display_name(),
            },
            stats: StatsView {
                hunger: snap.stats.hunger(),
                energy: snap.stats.energy(),
                happiness: snap.stats.happiness(),
                mood: snap.stats.mood(),
            },
            image_path: species.image_path(snap.stats.mood()),
            title: snap.title.clone(),
            event: snap.pending_event.clone(),
            history: snap.history.entries().to_vec(),
            summaries: snap.summaries.clone(),
            event_counter: snap.event_counter,
            young_reader: snap.reading_level.is_young(),
        }
    }
}

/// A session view plus what the operation just did.
#[derive(Debug, Serialize)]
pub struct TurnView {
    #[serde(flatten)]
    pub session: SessionView,
    pub effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub changed: bool,
    pub saved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_error: Option<String>,
    pub event_triggered: bool,
}

impl TurnView {
    pub fn new(id: &SessionId, outcome: TurnOutcome) -> Self {
        Self {
            session: SessionView::new(id, &outcome.snapshot),
            effect: outcome.effect,
            notice: outcome.notice,
            changed: outcome.changed,
            saved: outcome.saved,
            save_error: outcome.save_error,
            event_triggered: outcome.event_triggered,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SpeciesView {
    pub key: &'static str,
    pub display_name: &'static str,
    pub image_path: String,
    pub suggested_name: &'static str,
}

impl SpeciesView {
    pub fn new(species: Species, suggested_name: &'static str) -> Self {
        Self {
            key: species.key(),
            display_name: species.display_name(),
            image_path: species.image_path(Mood::Neutral),
            suggested_name,
        }
    }
}
