use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pawtale_core::{
    Event, HistoryLog, PetIdentity, PetStats, ReadingLevel, SessionSnapshot, Species,
};

use crate::error::StoreError;

/// On-disk shape of one session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub pet_name: String,
    pub pet_type: String,
    pub pet_state: PetStats,
    pub setup_complete: bool,
    #[serde(default)]
    pub current_event: Option<Event>,
    #[serde(default)]
    pub previous_events: Vec<String>,
    #[serde(default)]
    pub event_summaries: Vec<String>,
    #[serde(default)]
    pub story_title: Option<String>,
    #[serde(default)]
    pub event_counter: u32,
    #[serde(default)]
    pub young_reader_mode: bool,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub event_cooldown: u32,
}

impl SessionRecord {
    pub fn from_snapshot(snapshot: &SessionSnapshot, last_updated: DateTime<Utc>) -> Self {
        Self {
            pet_name: snapshot.identity.name().to_string(),
            pet_type: snapshot.identity.species().key().to_string(),
            pet_state: snapshot.stats,
            setup_complete: true,
            current_event: snapshot.pending_event.clone(),
            previous_events: snapshot.history.entries().to_vec(),
            event_summaries: snapshot.summaries.clone(),
            story_title: snapshot.title.clone(),
            event_counter: snapshot.event_counter,
            young_reader_mode: snapshot.reading_level.is_young(),
            last_updated,
            event_cooldown: snapshot.event_cooldown,
        }
    }

    /// Rebuild the snapshot. Records whose setup never completed yield `None`.
    pub fn into_snapshot(self, id: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        if !self.setup_complete {
            return Ok(None);
        }
        let corrupt = |reason: String| StoreError::Corrupt {
            id: id.to_string(),
            reason,
        };
        let species: Species = self.pet_type.parse().map_err(|e| corrupt(format!("{e}")))?;
        let identity =
            PetIdentity::new(&self.pet_name, species).map_err(|e| corrupt(format!("{e}")))?;

        Ok(Some(SessionSnapshot {
            identity,
            stats: self.pet_state,
            pending_event: self.current_event,
            history: HistoryLog::from(self.previous_events),
            summaries: self.event_summaries,
            title: self.story_title.filter(|t| !t.trim().is_empty()),
            event_counter: self.event_counter,
            reading_level: ReadingLevel::from_young_reader(self.young_reader_mode),
            event_cooldown: self.event_cooldown,
        }))
    }
}
