//! The extraction orchestrator: propose, validate, one corrective retry.
//!
//! Vision-language model output is unreliable JSON. A single bounded
//! repair round trip meaningfully improves yield without open-ended cost
//! or latency, so the flow is an explicit two-attempt sequence rather
//! than a retry loop: attempt one with the extraction prompt, and on any
//! failure a second attempt with a repair prompt that embeds the bad
//! output and the error. A second failure is terminal.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use canta_core::{CantaError, ImagePayload, MenuDocument, VisionModel};

use crate::prompt::{build_repair_prompt, EXTRACT_PROMPT};
use crate::schema::parse_and_validate;

/// Stand-in body for the repair prompt when the first call returned no
/// text at all.
const NO_OUTPUT_PLACEHOLDER: &str = "No JSON returned";

const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 3000;

/// One failed round trip: the raw text the model returned (if the call
/// itself succeeded) and what went wrong with it.
#[derive(Debug)]
pub struct AttemptFailure {
    pub raw: Option<String>,
    pub error: CantaError,
}

/// Terminal extraction failure: both the initial attempt and the repair
/// attempt failed. Carries full context for both, for diagnosis.
#[derive(Debug, Error)]
#[error("extraction failed after repair attempt: {}", .repair.error)]
pub struct ExtractionFailure {
    pub initial: AttemptFailure,
    pub repair: AttemptFailure,
}

/// Drives image bytes end to end into a validated [`MenuDocument`].
pub struct MenuExtractor {
    model: Arc<dyn VisionModel>,
    max_output_tokens: u32,
}

impl MenuExtractor {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self {
            model,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    /// Extract a validated menu document from an image.
    ///
    /// All-or-nothing: either a schema-valid document comes back, or an
    /// [`ExtractionFailure`] wrapping both failed attempts. No partial
    /// documents are ever returned.
    pub async fn extract(&self, image: &ImagePayload) -> Result<MenuDocument, ExtractionFailure> {
        let initial = match self.attempt(EXTRACT_PROMPT, image).await {
            Ok(doc) => {
                info!(
                    provider = self.model.name(),
                    items = doc.item_count(),
                    "extraction succeeded on first attempt"
                );
                return Ok(doc);
            }
            Err(failure) => failure,
        };

        warn!(
            provider = self.model.name(),
            error = %initial.error,
            "initial extraction failed, attempting repair"
        );

        let repair_prompt = build_repair_prompt(
            initial.raw.as_deref().unwrap_or(NO_OUTPUT_PLACEHOLDER),
            &initial.error.to_string(),
        );

        match self.attempt(&repair_prompt, image).await {
            Ok(doc) => {
                info!(
                    provider = self.model.name(),
                    items = doc.item_count(),
                    "repair attempt succeeded"
                );
                Ok(doc)
            }
            Err(repair) => {
                warn!(error = %repair.error, "repair attempt failed, giving up");
                Err(ExtractionFailure { initial, repair })
            }
        }
    }

    /// One prompt → model → parse/validate round trip.
    async fn attempt(
        &self,
        prompt: &str,
        image: &ImagePayload,
    ) -> Result<MenuDocument, AttemptFailure> {
        let raw = match self
            .model
            .describe(prompt, image, self.max_output_tokens)
            .await
        {
            Ok(text) => text,
            Err(error) => return Err(AttemptFailure { raw: None, error }),
        };

        debug!(chars = raw.len(), "model returned completion");

        match parse_and_validate(&raw) {
            Ok(doc) => Ok(doc),
            Err(error) => Err(AttemptFailure {
                raw: Some(raw),
                error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Scripted model: pops canned responses in order and records the
    /// prompts it was called with.
    struct ScriptedModel {
        responses: Mutex<Vec<Result<String, CantaError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String, CantaError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                prompts: Mutex::new(Vec::new()),
            })
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VisionModel for ScriptedModel {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn describe(
            &self,
            prompt: &str,
            _image: &ImagePayload,
            _max_output_tokens: u32,
        ) -> Result<String, CantaError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn image() -> ImagePayload {
        ImagePayload::new(vec![0xff, 0xd8, 0xff], "image/jpeg")
    }

    const VALID_FENCED: &str = "```json\n{\"source\":\"Cafe Menu\",\"sections\":[{\"name\":\"Mains\",\"items\":[{\"name\":\"Nasi Lemak\",\"price\":{\"value\":\"RM 12\"}}]}]}\n```";

    #[tokio::test]
    async fn fenced_response_succeeds_first_attempt() {
        let model = ScriptedModel::new(vec![Ok(VALID_FENCED.to_string())]);
        let extractor = MenuExtractor::new(model.clone());

        let doc = extractor.extract(&image()).await.unwrap();
        let item = &doc.sections[0].items[0];
        assert_eq!(item.price.value, Some(12.0));
        assert_eq!(item.price.currency, "MYR");
        assert_eq!(item.size.value, None);
        assert_eq!(item.size.unit, None);
        assert!(item.extras.is_empty());
        assert_eq!(model.prompts().len(), 1);
    }

    #[tokio::test]
    async fn prose_then_valid_json_succeeds_via_repair() {
        let model = ScriptedModel::new(vec![
            Ok("Sure! Here is the menu you asked about.".to_string()),
            Ok("{\"source\":\"Cafe\",\"sections\":[]}".to_string()),
        ]);
        let extractor = MenuExtractor::new(model.clone());

        let doc = extractor.extract(&image()).await.unwrap();
        assert_eq!(doc.source, "Cafe");
        assert_eq!(doc.schema.name, "canta.menu");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 2);
        // Repair prompt embeds the first response verbatim.
        assert!(prompts[1].contains("Sure! Here is the menu"));
    }

    #[tokio::test]
    async fn two_malformed_responses_fail_terminally() {
        let model = ScriptedModel::new(vec![
            Ok("{broken".to_string()),
            Ok("{still broken".to_string()),
        ]);
        let extractor = MenuExtractor::new(model.clone());

        let failure = extractor.extract(&image()).await.unwrap_err();
        assert!(matches!(failure.initial.error, CantaError::Decode(_)));
        assert!(matches!(failure.repair.error, CantaError::Decode(_)));
        assert_eq!(failure.initial.raw.as_deref(), Some("{broken"));
        assert_eq!(failure.repair.raw.as_deref(), Some("{still broken"));
        assert_eq!(model.prompts().len(), 2);
    }

    #[tokio::test]
    async fn upstream_failure_uses_placeholder_in_repair_prompt() {
        let model = ScriptedModel::new(vec![
            Err(CantaError::Upstream("connection reset".to_string())),
            Ok("{\"source\":\"Cafe\",\"sections\":[]}".to_string()),
        ]);
        let extractor = MenuExtractor::new(model.clone());

        let doc = extractor.extract(&image()).await.unwrap();
        assert_eq!(doc.source, "Cafe");

        let prompts = model.prompts();
        assert!(prompts[1].contains("No JSON returned"));
        assert!(prompts[1].contains("connection reset"));
    }

    #[tokio::test]
    async fn schema_violation_surfaces_in_repair_prompt() {
        let missing_name = "{\"source\":\"Cafe\",\"sections\":[{\"items\":[{\"price\":{\"value\":5}}]}]}";
        let model = ScriptedModel::new(vec![
            Ok(missing_name.to_string()),
            Ok("{nope".to_string()),
        ]);
        let extractor = MenuExtractor::new(model.clone());

        let failure = extractor.extract(&image()).await.unwrap_err();
        assert!(matches!(failure.initial.error, CantaError::Schema { .. }));
        assert!(model.prompts()[1].contains("sections[0].items[0].name"));
    }
}
