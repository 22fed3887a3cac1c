//! Record shape consumed by the external catalog store.
//!
//! The store itself lives outside this backend; we only guarantee the
//! field names it expects when persisting an extracted item keyed by
//! `(source_id, page)`.

use serde::{Deserialize, Serialize};

use crate::menu::{MenuItem, Price, Size};

/// Review state of a stored catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    /// Produced by extraction, not yet touched by a human.
    Ai,
    Edited,
    Verified,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub price: Price,
    pub size: Size,
    pub barcode: Option<String>,
    pub tags: Option<Vec<String>>,
    pub confidence: f64,
    pub status: CatalogStatus,
}

impl From<&MenuItem> for CatalogRecord {
    fn from(item: &MenuItem) -> Self {
        Self {
            name: Some(item.name.clone()),
            brand: None,
            price: item.price.clone(),
            size: item.size.clone(),
            barcode: None,
            tags: item.tags.clone(),
            confidence: 1.0,
            status: CatalogStatus::Ai,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn record_from_item_defaults_to_ai_status() {
        let item = MenuItem {
            name: "Kaya Toast".to_string(),
            price: Price {
                value: Some(3.5),
                currency: "MYR".to_string(),
            },
            size: Size::default(),
            desc: None,
            tags: Some(vec!["breakfast".to_string()]),
            extras: Map::new(),
        };
        let record = CatalogRecord::from(&item);
        assert_eq!(record.name.as_deref(), Some("Kaya Toast"));
        assert_eq!(record.status, CatalogStatus::Ai);
        assert_eq!(record.price.value, Some(3.5));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["status"], "ai");
        assert_eq!(json["price"]["currency"], "MYR");
    }
}
