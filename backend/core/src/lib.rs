pub mod catalog;
pub mod error;
pub mod menu;
pub mod mime;
pub mod traits;

pub use catalog::{CatalogRecord, CatalogStatus};
pub use error::CantaError;
pub use menu::{MenuDocument, MenuItem, Price, SchemaTag, Section, Size};
pub use traits::{ImagePayload, VisionModel};
