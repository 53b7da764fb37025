use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::event::Effect;

/// Inclusive bounds shared by every stat.
pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 10;

/// Stats below this value count as critical for mood and event triggering.
pub const CRITICAL_STAT_THRESHOLD: u8 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Happy,
    Hungry,
    Tired,
    Sad,
    Neutral,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Hungry => "hungry",
            Self::Tired => "tired",
            Self::Sad => "sad",
            Self::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Care actions the player can take outside of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Feed,
    Play,
    Rest,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Play => "play",
            Self::Rest => "rest",
        }
    }

    /// Stat deltas this action applies.
    pub fn effect(self) -> Effect {
        match self {
            Self::Feed => Effect::new(2, 0, 0),
            Self::Play => Effect::new(-1, -1, 2),
            Self::Rest => Effect::new(0, 2, 0),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feed" => Ok(Self::Feed),
            "play" => Ok(Self::Play),
            "rest" => Ok(Self::Rest),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// The pet's three bounded stats plus the mood derived from them.
///
/// Fields are private so every construction path goes through [`PetStats::new`],
/// which clamps to `[STAT_MIN, STAT_MAX]` and recomputes the mood. Deserialized
/// values are clamped too and any stored mood is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StatsRecord", into = "StatsRecord")]
pub struct PetStats {
    hunger: u8,
    energy: u8,
    happiness: u8,
    mood: Mood,
}

impl PetStats {
    pub fn new(hunger: i32, energy: i32, happiness: i32) -> Self {
        let hunger = clamp_stat(hunger);
        let energy = clamp_stat(energy);
        let happiness = clamp_stat(happiness);
        Self {
            hunger,
            energy,
            happiness,
            mood: mood_for(hunger, energy, happiness),
        }
    }

    pub fn hunger(&self) -> u8 {
        self.hunger
    }

    pub fn energy(&self) -> u8 {
        self.energy
    }

    pub fn happiness(&self) -> u8 {
        self.happiness
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// True when any stat sits below [`CRITICAL_STAT_THRESHOLD`].
    pub fn is_critical(&self) -> bool {
        self.hunger < CRITICAL_STAT_THRESHOLD
            || self.energy < CRITICAL_STAT_THRESHOLD
            || self.happiness < CRITICAL_STAT_THRESHOLD
    }

    pub fn apply_action(&self, action: Action) -> Self {
        self.apply_effects(&action.effect())
    }

    pub fn apply_effects(&self, effect: &Effect) -> Self {
        let (h, e, hap) = self.as_i32();
        Self::new(h + effect.hunger, e + effect.energy, hap + effect.happiness)
    }

    fn as_i32(&self) -> (i32, i32, i32) {
        (
            i32::from(self.hunger),
            i32::from(self.energy),
            i32::from(self.happiness),
        )
    }
}

impl Default for PetStats {
    fn default() -> Self {
        Self::new(5, 5, 5)
    }
}

/// Mood for a set of stats. Priority: hungry, tired, sad, otherwise happy.
pub fn derive_mood(stats: &PetStats) -> Mood {
    mood_for(stats.hunger, stats.energy, stats.happiness)
}

fn mood_for(hunger: u8, energy: u8, happiness: u8) -> Mood {
    if hunger < CRITICAL_STAT_THRESHOLD {
        Mood::Hungry
    } else if energy < CRITICAL_STAT_THRESHOLD {
        Mood::Tired
    } else if happiness < CRITICAL_STAT_THRESHOLD {
        Mood::Sad
    } else {
        Mood::Happy
    }
}

fn clamp_stat(value: i32) -> u8 {
    value.clamp(STAT_MIN, STAT_MAX) as u8
}

/// Wire shape of `pet_state` in persisted records and API payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct StatsRecord {
    hunger: i32,
    energy: i32,
    happiness: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    mood: Option<Mood>,
}

impl From<StatsRecord> for PetStats {
    fn from(record: StatsRecord) -> Self {
        Self::new(record.hunger, record.energy, record.happiness)
    }
}

impl From<PetStats> for StatsRecord {
    fn from(stats: PetStats) -> Self {
        Self {
            hunger: i32::from(stats.hunger),
            energy: i32::from(stats.energy),
            happiness: i32::from(stats.happiness),
            mood: Some(stats.mood),
        }
    }
}
