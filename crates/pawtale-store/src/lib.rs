//! JSON-file persistence for play sessions.

pub mod error;
pub mod record;
pub mod sessions;

pub use error::StoreError;
pub use record::SessionRecord;
pub use sessions::{write_atomic, SessionStore};
