use async_trait::async_trait;
use bytes::Bytes;
use serde_json::Value;

use pawtale_core::errors::GatewayError;

/// Name of the forced function tool used to obtain schema-shaped output.
pub const STRUCTURED_TOOL_NAME: &str = "generate_structured_output";

/// A system + user prompt pair.
#[derive(Clone, Debug, Default)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    /// Overrides the backend's configured temperature.
    pub temperature: Option<f64>,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: None,
        }
    }
}

/// Chat-style text generation backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;
    fn model(&self) -> &str;

    /// Generate a JSON object shaped by `schema`.
    ///
    /// The returned value is whatever the backend produced; validating it
    /// against the schema is the caller's job.
    async fn generate_structured(&self, prompt: &Prompt, schema: &Value)
        -> Result<Value, GatewayError>;

    /// Generate free text.
    async fn complete_text(&self, prompt: &Prompt) -> Result<String, GatewayError>;
}

/// Text-to-speech backend.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, GatewayError>;
}

/// Image generation backend. Returns a URL to the rendered image.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn render_image(&self, prompt: &str) -> Result<String, GatewayError>;
}
