//! HTTP API and embedded single-page UI.

pub mod error;
pub mod handlers;
pub mod server;
pub mod view;

pub use error::ApiError;
pub use server::{build_router, start, AppState, ServerConfig, ServerHandle};
