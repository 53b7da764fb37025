//! OpenAI-compatible HTTP backend: chat completions, speech and images.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use pawtale_core::errors::GatewayError;

use crate::provider::{ImageProvider, LlmProvider, Prompt, SpeechProvider, STRUCTURED_TOOL_NAME};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
    pub speech_model: String,
    pub image_model: String,
    pub image_size: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(60),
            speech_model: "tts-1".to_string(),
            image_model: "dall-e-3".to_string(),
            image_size: "1024x1024".to_string(),
        }
    }
}

/// One client serving the chat, speech and image endpoints.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::InvalidRequest(format!("http client: {e}")))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn api_key(&self) -> Result<&SecretString, GatewayError> {
        self.config
            .api_key
            .as_ref()
            .ok_or_else(|| GatewayError::NotConfigured("OPENAI_API_KEY is not set".into()))
    }

    async fn post(&self, path: &str, body: &Value) -> Result<reqwest::Response, GatewayError> {
        let key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .bearer_auth(key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            let message = parse_api_error(&body_text);
            warn!(%url, status = status.as_u16(), error = %message, "backend returned error status");
            return Err(GatewayError::from_status(status.as_u16(), message));
        }
        Ok(response)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, GatewayError> {
        let response = self.post(path, body).await?;
        response
            .json::<Value>()
            .await
            .map_err(|e| self.classify_transport(e))
    }

    fn classify_transport(&self, err: reqwest::Error) -> GatewayError {
        if err.is_timeout() {
            GatewayError::Timeout(self.config.timeout)
        } else if err.is_decode() {
            GatewayError::UnexpectedResponse(err.to_string())
        } else {
            GatewayError::NetworkError(err.to_string())
        }
    }

    fn chat_body(&self, prompt: &Prompt) -> Value {
        json!({
            "model": self.config.model,
            "temperature": prompt.temperature.unwrap_or(self.config.temperature),
            "messages": [
                {"role": "system", "content": prompt.system},
                {"role": "user", "content": prompt.user},
            ],
        })
    }
}

/// Pull a human-readable message out of an error body.
fn parse_api_error(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.to_string())
}

/// Structured output from a chat completion: tool-call arguments first,
/// message content as fallback.
fn extract_structured(response: &Value) -> Result<Value, GatewayError> {
    let message = &response["choices"][0]["message"];

    if let Some(args) = message["tool_calls"][0]["function"]["arguments"].as_str() {
        match serde_json::from_str::<Value>(args) {
            Ok(v) => return Ok(v),
            Err(e) => debug!(error = %e, "tool call arguments are not JSON, trying content"),
        }
    }

    if let Some(content) = message["content"].as_str() {
        if let Ok(v) = serde_json::from_str::<Value>(content) {
            return Ok(v);
        }
    }

    Err(GatewayError::UnexpectedResponse(
        "no structured output in response".into(),
    ))
}

#[async_trait]
impl LlmProvider for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn generate_structured(
        &self,
        prompt: &Prompt,
        schema: &Value,
    ) -> Result<Value, GatewayError> {
        let mut body = self.chat_body(prompt);
        body["response_format"] = json!({"type": "json_object"});
        body["tools"] = json!([{
            "type": "function",
            "function": {
                "name": STRUCTURED_TOOL_NAME,
                "description": "Generate a structured output based on the schema",
                "parameters": schema,
            }
        }]);
        body["tool_choice"] = json!({
            "type": "function",
            "function": {"name": STRUCTURED_TOOL_NAME}
        });

        let response = self.post_json("/chat/completions", &body).await?;
        extract_structured(&response)
    }

    #[instrument(skip_all, fields(model = %self.config.model))]
    async fn complete_text(&self, prompt: &Prompt) -> Result<String, GatewayError> {
        let response = self
            .post_json("/chat/completions", &self.chat_body(prompt))
            .await?;
        response["choices"][0]["message"]["content"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| GatewayError::UnexpectedResponse("no message content".into()))
    }
}

#[async_trait]
impl SpeechProvider for OpenAiClient {
    #[instrument(skip_all, fields(voice = %voice, chars = text.len()))]
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Bytes, GatewayError> {
        let body = json!({
            "model": self.config.speech_model,
            "voice": voice,
            "input": text,
        });
        let response = self.post("/audio/speech", &body).await?;
        response.bytes().await.map_err(|e| self.classify_transport(e))
    }
}

#[async_trait]
impl ImageProvider for OpenAiClient {
    #[instrument(skip_all, fields(model = %self.config.image_model))]
    async fn render_image(&self, prompt: &str) -> Result<String, GatewayError> {
        let body = json!({
            "model": self.config.image_model,
            "prompt": prompt,
            "n": 1,
            "size": self.config.image_size,
        });
        let response = self.post_json("/images/generations", &body).await?;
        response["data"][0]["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| GatewayError::UnexpectedResponse("no image url".into()))
    }
}
