use pawtale_core::errors::GatewayError;
use pawtale_core::{IdentityError, InvalidSessionId, SessionId, UnknownSpecies};
use pawtale_store::StoreError;

/// Failure to obtain a usable story artifact from the model backend.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("gateway error: {0}")]
    Gateway(GatewayError),

    /// The backend answered, but not with something we can use.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<GatewayError> for GenerationError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::UnexpectedResponse(msg) => Self::Malformed(msg),
            other => Self::Gateway(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NarrationError {
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("audio cache error: {0}")]
    Cache(String),
}

impl From<StoreError> for NarrationError {
    fn from(e: StoreError) -> Self {
        Self::Cache(e.to_string())
    }
}

impl From<std::io::Error> for NarrationError {
    fn from(e: std::io::Error) -> Self {
        Self::Cache(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error(transparent)]
    InvalidSession(#[from] InvalidSessionId),

    #[error("session not found: {0}")]
    SessionNotFound(SessionId),

    #[error("session already set up: {0}")]
    AlreadySetUp(SessionId),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    UnknownSpecies(#[from] UnknownSpecies),

    #[error("no pending event to narrate")]
    NoPendingEvent,

    #[error("narration is disabled")]
    NarrationDisabled,

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
