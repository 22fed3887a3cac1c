use async_trait::async_trait;

use crate::error::CantaError;

/// Raw image handed to the extraction pipeline.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }
}

/// An external vision-language model: given a text prompt and one image,
/// return a text completion.
///
/// Implementations own transport, encoding, and timeout. They must not
/// retry — the repair policy lives in the extraction orchestrator.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &str;

    /// Send one prompt + image round trip and return the trimmed
    /// completion text.
    async fn describe(
        &self,
        prompt: &str,
        image: &ImagePayload,
        max_output_tokens: u32,
    ) -> Result<String, CantaError>;
}
