use serde::{Deserialize, Serialize};

use crate::ids::EventId;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 4;
pub const EFFECT_MIN: i32 = -5;
pub const EFFECT_MAX: i32 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    #[default]
    Random,
    Weather,
    TimeBased,
    StatBased,
}

/// Per-stat deltas applied when an option is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub hunger: i32,
    pub energy: i32,
    pub happiness: i32,
}

impl Effect {
    pub const NONE: Effect = Effect {
        hunger: 0,
        energy: 0,
        happiness: 0,
    };

    pub const fn new(hunger: i32, energy: i32, happiness: i32) -> Self {
        Self {
            hunger,
            energy,
            happiness,
        }
    }

    pub fn in_range(&self) -> bool {
        [self.hunger, self.energy, self.happiness]
            .iter()
            .all(|v| (EFFECT_MIN..=EFFECT_MAX).contains(v))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOption {
    pub text: String,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
}

/// A story beat awaiting the player's choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EventId>,
    #[serde(rename = "event_type", default)]
    pub kind: EventKind,
    pub title: String,
    pub description: String,
    pub options: Vec<EventOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventShapeError {
    #[error("event has {0} options, expected {MIN_OPTIONS}..={MAX_OPTIONS}")]
    OptionCount(usize),
    #[error("option {index} effect out of range: {effect:?}")]
    EffectOutOfRange { index: usize, effect: Effect },
    #[error("event field `{0}` is empty")]
    EmptyField(&'static str),
}

impl Event {
    /// Checks the structural rules every event must satisfy before it is shown.
    pub fn validate(&self) -> Result<(), EventShapeError> {
        if self.title.trim().is_empty() {
            return Err(EventShapeError::EmptyField("title"));
        }
        if self.description.trim().is_empty() {
            return Err(EventShapeError::EmptyField("description"));
        }
        if !(MIN_OPTIONS..=MAX_OPTIONS).contains(&self.options.len()) {
            return Err(EventShapeError::OptionCount(self.options.len()));
        }
        for (index, option) in self.options.iter().enumerate() {
            if option.text.trim().is_empty() {
                return Err(EventShapeError::EmptyField("options.text"));
            }
            if !option.effect.in_range() {
                return Err(EventShapeError::EffectOutOfRange {
                    index,
                    effect: option.effect,
                });
            }
        }
        Ok(())
    }

    /// Effect of the option at `index`, or [`Effect::NONE`] when out of range.
    pub fn effect_of(&self, index: usize) -> Effect {
        self.options
            .get(index)
            .map(|o| o.effect)
            .unwrap_or(Effect::NONE)
    }
}
