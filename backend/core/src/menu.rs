//! The canonical `canta.menu` document types.
//!
//! A [`MenuDocument`] is only ever produced by the extraction validator;
//! nothing else in the system assembles one from untrusted data. Once
//! validated it is treated as immutable — legacy views are derived through
//! the response shapers, never by mutation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const SCHEMA_NAME: &str = "canta.menu";
pub const SCHEMA_VERSION: &str = "1.0";

/// Self-describing format tag, always `{canta.menu, 1.0}` on output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTag {
    pub name: String,
    pub version: String,
}

impl Default for SchemaTag {
    fn default() -> Self {
        Self {
            name: SCHEMA_NAME.to_string(),
            version: SCHEMA_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub value: Option<f64>,
    pub currency: String,
}

impl Default for Price {
    fn default() -> Self {
        Self {
            value: None,
            currency: "MYR".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub value: Option<f64>,
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub size: Size,
    pub desc: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Attributes outside the fixed schema (secondary prices, spice level,
    /// ...). Always a mapping, never null.
    #[serde(default)]
    pub extras: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: Option<String>,
    pub time: Option<String>,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuDocument {
    pub source: String,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub meta: Map<String, Value>,
    #[serde(default)]
    pub schema: SchemaTag,
}

impl MenuDocument {
    /// Total number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }

    /// First item in document order, if any.
    pub fn first_item(&self) -> Option<&MenuItem> {
        self.sections.iter().flat_map(|s| s.items.iter()).next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_tag_defaults_to_canonical() {
        let tag = SchemaTag::default();
        assert_eq!(tag.name, "canta.menu");
        assert_eq!(tag.version, "1.0");
    }

    #[test]
    fn price_defaults_to_myr() {
        let price = Price::default();
        assert_eq!(price.currency, "MYR");
        assert!(price.value.is_none());
    }

    #[test]
    fn document_serializes_with_schema_field() {
        let doc = MenuDocument {
            source: "Test".to_string(),
            sections: vec![],
            meta: Map::new(),
            schema: SchemaTag::default(),
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["schema"]["name"], "canta.menu");
        assert_eq!(json["schema"]["version"], "1.0");
        assert!(json["sections"].as_array().unwrap().is_empty());
    }

    #[test]
    fn first_item_walks_sections_in_order() {
        let doc = MenuDocument {
            source: "Test".to_string(),
            sections: vec![
                Section::default(),
                Section {
                    items: vec![MenuItem {
                        name: "Teh Tarik".to_string(),
                        price: Price::default(),
                        size: Size::default(),
                        desc: None,
                        tags: None,
                        extras: Map::new(),
                    }],
                    ..Section::default()
                },
            ],
            meta: Map::new(),
            schema: SchemaTag::default(),
        };
        assert_eq!(doc.first_item().unwrap().name, "Teh Tarik");
        assert_eq!(doc.item_count(), 1);
    }
}
