use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::Value;

use pawtale_core::errors::GatewayError;

use crate::provider::{ImageProvider, LlmProvider, Prompt, SpeechProvider};

/// Pre-programmed responses for deterministic testing without API calls.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Reply to `generate_structured`.
    Json(Value),
    /// Reply to `complete_text`.
    Text(String),
    /// Reply to `synthesize`.
    Audio(Bytes),
    /// Reply to `render_image`.
    ImageUrl(String),
    /// Fail whichever call consumes this response.
    Error(GatewayError),
    /// Wait a duration, then resolve the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// Mock backend that returns pre-programmed responses in sequence.
///
/// Every call consumes the next response regardless of which method was
/// called; a response of the wrong kind is reported as an error.
pub struct MockProvider {
    responses: Mutex<VecDeque<MockResponse>>,
    call_count: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            call_count: AtomicUsize::new(0),
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::Relaxed)
    }

    /// User prompts, speech texts and image prompts seen so far, in order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().clone()
    }

    pub fn push(&self, response: MockResponse) {
        self.responses.lock().push_back(response);
    }

    async fn next(&self, input: &str) -> Result<MockResponse, GatewayError> {
        let idx = self.call_count.fetch_add(1, Ordering::Relaxed);
        self.inputs.lock().push(input.to_string());

        let popped = self.responses.lock().pop_front();
        let Some(mut current) = popped else {
            return Err(GatewayError::InvalidRequest(format!(
                "MockProvider: no response configured for call {idx}"
            )));
        };
        loop {
            match current {
                MockResponse::Delay(duration, inner) => {
                    tokio::time::sleep(duration).await;
                    current = *inner;
                }
                MockResponse::Error(e) => return Err(e),
                other => return Ok(other),
            }
        }
    }
}

fn wrong_kind(expected: &str, got: &MockResponse) -> GatewayError {
    GatewayError::InvalidRequest(format!("MockProvider: expected {expected}, got {got:?}"))
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate_structured(
        &self,
        prompt: &Prompt,
        _schema: &Value,
    ) -> Result<Value, GatewayError> {
        match self.next(&prompt.user).await? {
            MockResponse::Json(v) => Ok(v),
            other => Err(wrong_kind("Json", &other)),
        }
    }

    async fn complete_text(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        match self.next(&prompt.user).await? {
            MockResponse::Text(t) => Ok(t),
            other => Err(wrong_kind("Text", &other)),
        }
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(&self, text: &str, _voice: &str) -> Result<Bytes, GatewayError> {
        match self.next(text).await? {
            MockResponse::Audio(b) => Ok(b),
            other => Err(wrong_kind("Audio", &other)),
        }
    }
}

#[async_trait]
impl ImageProvider for MockProvider {
    async fn render_image(&self, prompt: &str) -> Result<String, GatewayError> {
        match self.next(prompt).await? {
            MockResponse::ImageUrl(u) => Ok(u),
            other => Err(wrong_kind("ImageUrl", &other)),
        }
    }
}
