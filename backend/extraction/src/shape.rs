//! Legacy response shapers.
//!
//! The original frontend consumes a flat `{description, raw_response,
//! status}` envelope instead of the full document, so these adapters
//! compress a validated [`MenuDocument`] into that shape. They are
//! presentation-only: extraction failures become `status: "error"`
//! envelopes here and never propagate further.

use serde::Serialize;
use serde_json::json;

use canta_core::{MenuDocument, MenuItem};

use crate::pipeline::ExtractionFailure;

/// How many sample items to show per section in the box summary.
const SAMPLE_ITEMS_PER_SECTION: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct ShapedResponse {
    pub description: String,
    pub raw_response: String,
    pub status: String,
}

impl ShapedResponse {
    fn success(description: String, doc: &MenuDocument) -> Self {
        Self {
            description,
            raw_response: serde_json::to_string_pretty(doc)
                .unwrap_or_else(|_| json!(null).to_string()),
            status: "success".to_string(),
        }
    }

    fn error(err: &ExtractionFailure) -> Self {
        Self {
            description: format!("Error: {err}"),
            raw_response: format!("Error occurred: {err}"),
            status: "error".to_string(),
        }
    }
}

/// Multi-line human-readable summary of the whole document: source line,
/// per-section item counts, up to three sample items per section, and a
/// running total.
pub fn box_summary(outcome: &Result<MenuDocument, ExtractionFailure>) -> ShapedResponse {
    let doc = match outcome {
        Ok(doc) => doc,
        Err(err) => return ShapedResponse::error(err),
    };

    let mut lines = Vec::new();
    if !doc.source.is_empty() {
        lines.push(format!("Source: {}", doc.source));
    }

    let mut total_items = 0;
    for section in &doc.sections {
        total_items += section.items.len();
        if let Some(name) = &section.name {
            lines.push(format!("\n{}: {} items", name, section.items.len()));
        }
        for item in section.items.iter().take(SAMPLE_ITEMS_PER_SECTION) {
            let mut line = format!("- {}", item.name);
            // A zero price counts as unpriced in the legacy summaries.
            if let Some(value) = item.price.value.filter(|v| *v != 0.0) {
                line.push_str(&format!(" ({} {:.2})", item.price.currency, value));
            }
            lines.push(line);
        }
    }
    lines.push(format!("\nTotal items detected: {total_items}"));

    ShapedResponse::success(lines.join("\n"), doc)
}

/// Short text block describing the first item in document order, or a
/// fixed message when the document has no items.
pub fn first_item_summary(outcome: &Result<MenuDocument, ExtractionFailure>) -> ShapedResponse {
    let doc = match outcome {
        Ok(doc) => doc,
        Err(err) => return ShapedResponse::error(err),
    };

    let description = match doc.first_item() {
        Some(item) => describe_item(item),
        None => "No items detected in the image".to_string(),
    };

    ShapedResponse::success(description, doc)
}

fn describe_item(item: &MenuItem) -> String {
    let mut text = format!("Item: {}\n", item.name);
    if let Some(desc) = &item.desc {
        text.push_str(&format!("Description: {desc}\n"));
    }
    // Zero price/size count as absent in the legacy summaries.
    if let Some(value) = item.price.value.filter(|v| *v != 0.0) {
        text.push_str(&format!("Price: {} {:.2}\n", item.price.currency, value));
    }
    if let Some(value) = item.size.value.filter(|v| *v != 0.0) {
        let unit = item.size.unit.as_deref().unwrap_or("");
        text.push_str(&format!("Size: {value} {unit}\n"));
    }
    if let Some(tags) = &item.tags {
        text.push_str(&format!("Tags: {}\n", tags.join(", ")));
    }
    text.trim_end().to_string()
}
