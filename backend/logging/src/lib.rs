//! Structured logging for the Canta backend.
//!
//! Handles log redaction, JSON file output, and environment-based level
//! control.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::{key_preview, redact_sensitive_data};
