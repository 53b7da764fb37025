use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::history::HistoryLog;
use crate::species::Species;
use crate::stats::PetStats;

/// Longest pet name accepted at setup.
pub const MAX_PET_NAME_LEN: usize = 40;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("pet name must not be empty")]
    EmptyName,
    #[error("pet name is longer than {MAX_PET_NAME_LEN} characters")]
    NameTooLong,
}

/// Who the pet is. Fixed once setup completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "IdentityRecord")]
pub struct PetIdentity {
    name: String,
    species: Species,
}

impl PetIdentity {
    pub fn new(name: &str, species: Species) -> Result<Self, IdentityError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        if name.chars().count() > MAX_PET_NAME_LEN {
            return Err(IdentityError::NameTooLong);
        }
        Ok(Self {
            name: name.to_owned(),
            species,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn species(&self) -> Species {
        self.species
    }
}

#[derive(Deserialize)]
struct IdentityRecord {
    name: String,
    species: Species,
}

impl TryFrom<IdentityRecord> for PetIdentity {
    type Error = IdentityError;
    fn try_from(record: IdentityRecord) -> Result<Self, Self::Error> {
        Self::new(&record.name, record.species)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingLevel {
    #[default]
    Standard,
    Young,
}

impl ReadingLevel {
    pub fn from_young_reader(young: bool) -> Self {
        if young {
            Self::Young
        } else {
            Self::Standard
        }
    }

    pub fn is_young(self) -> bool {
        matches!(self, Self::Young)
    }
}

/// Everything that makes up one play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub identity: PetIdentity,
    pub stats: PetStats,
    pub pending_event: Option<Event>,
    pub history: HistoryLog,
    pub summaries: Vec<String>,
    pub title: Option<String>,
    pub event_counter: u32,
    pub reading_level: ReadingLevel,
    pub event_cooldown: u32,
}

impl SessionSnapshot {
    /// A fresh session with default stats and no story yet.
    pub fn new(identity: PetIdentity, reading_level: ReadingLevel) -> Self {
        Self {
            identity,
            stats: PetStats::default(),
            pending_event: None,
            history: HistoryLog::new(),
            summaries: Vec::new(),
            title: None,
            event_counter: 0,
            reading_level,
            event_cooldown: 0,
        }
    }
}
