//! Structured extraction pipeline for the `canta.menu` schema.
//!
//! Turns an unstructured menu/catalog image into a schema-validated
//! [`canta_core::MenuDocument`]: prompt construction, response parsing,
//! tolerant normalization, strict validation, and a single bounded repair
//! round trip when the model's first answer does not validate.

pub mod money;
pub mod pipeline;
pub mod prompt;
pub mod schema;
pub mod shape;

pub use money::normalize_money;
pub use pipeline::{AttemptFailure, ExtractionFailure, MenuExtractor};
pub use schema::parse_and_validate;
pub use shape::{box_summary, first_item_summary, ShapedResponse};
