//! OpenAI chat-completions vision adapter.
//!
//! Sends one text prompt plus one base64 data-URL image per request and
//! returns the trimmed completion. Decoding is near-deterministic
//! (temperature 0.1) to favor schema compliance over creativity. No
//! retries here — the repair policy lives in the extraction orchestrator.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use canta_core::{CantaError, ImagePayload, VisionModel};
use canta_logging::redact_sensitive_data;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const TEMPERATURE: f32 = 0.1;

pub struct OpenAiVision {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiVision {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Build the upstream error for a non-2xx response. Provider error bodies
/// can echo request credentials, so the body is scrubbed before it lands
/// in an error message that will be logged.
fn upstream_error(status: reqwest::StatusCode, body: &str) -> CantaError {
    CantaError::Upstream(format!(
        "model returned {status}: {}",
        redact_sensitive_data(body)
    ))
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl VisionModel for OpenAiVision {
    fn name(&self) -> &str {
        "openai"
    }

    async fn describe(
        &self,
        prompt: &str,
        image: &ImagePayload,
        max_output_tokens: u32,
    ) -> Result<String, CantaError> {
        let data_url = format!(
            "data:{};base64,{}",
            image.mime,
            STANDARD.encode(&image.bytes)
        );

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url", "image_url": { "url": data_url } }
                ]
            }],
            "max_tokens": max_output_tokens,
            "temperature": TEMPERATURE,
        });

        debug!(model = %self.model, image_bytes = image.bytes.len(), "calling vision model");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| CantaError::Upstream(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(upstream_error(status, &error_body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| CantaError::Upstream(format!("unreadable response body: {e}")))?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(CantaError::Upstream(
                "model returned no completion".to_string(),
            ));
        }

        Ok(content)
    }
}
