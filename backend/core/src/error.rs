use thiserror::Error;

/// Top-level error type for the Canta backend.
#[derive(Debug, Error)]
pub enum CantaError {
    /// The external vision model call failed or returned no completion.
    #[error("vision provider error: {0}")]
    Upstream(String),

    /// The model returned text that is not valid JSON after fence-stripping.
    #[error("invalid JSON from model: {0}")]
    Decode(String),

    /// The JSON parsed but violates the canta.menu schema.
    #[error("schema violation at `{path}`: {reason}")]
    Schema { path: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CantaError {
    pub fn schema(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
