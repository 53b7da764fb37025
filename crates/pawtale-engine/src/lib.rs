//! Game engine: event generation, illustration, narration and the
//! [`PetGame`] orchestrator that runs each player operation against a
//! stored session.

pub mod error;
pub mod game;
pub mod generator;
pub mod illustration;
pub mod lock;
pub mod narration;

pub use error::{GameError, GenerationError, NarrationError};
pub use game::{GameConfig, PetGame, TurnOutcome};
pub use generator::{event_schema, parse_event, EventGenerator, StoryStarter};
pub use illustration::Illustrator;
pub use lock::SessionLocks;
pub use narration::{
    AudioHandle, NarrationConfig, NarrationRequest, NarrationService, NarrationStatus, Narrator,
};
