#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("invalid session id: {0:?}")]
    InvalidId(String),

    #[error("corrupt record {id}: {reason}")]
    Corrupt { id: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
