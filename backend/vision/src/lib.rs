//! Vision client adapters for the Canta extraction pipeline.

pub mod openai;

pub use openai::OpenAiVision;
