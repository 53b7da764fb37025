//! Model backends: provider traits, the OpenAI-compatible HTTP client, a
//! retrying wrapper and a scripted mock for tests.

pub mod mock;
pub mod openai;
pub mod provider;
pub mod reliable;

pub use mock::{MockProvider, MockResponse};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use provider::{ImageProvider, LlmProvider, Prompt, SpeechProvider, STRUCTURED_TOOL_NAME};
pub use reliable::{ReliableConfig, ReliableProvider};
