//! Domain model for the pet: stats, events, history, species catalog and the
//! policy deciding when a story event fires.

pub mod errors;
pub mod event;
pub mod history;
pub mod ids;
pub mod snapshot;
pub mod species;
pub mod stats;
pub mod trigger;

pub use errors::GatewayError;
pub use event::{Effect, Event, EventKind, EventOption, EventShapeError};
pub use history::HistoryLog;
pub use ids::{EventId, InvalidSessionId, SessionId};
pub use snapshot::{IdentityError, PetIdentity, ReadingLevel, SessionSnapshot};
pub use species::{Species, UnknownSpecies};
pub use stats::{derive_mood, Action, Mood, PetStats};
pub use trigger::{TriggerConfig, TriggerPolicy};
