//! Two-phase schema validation for `canta.menu` documents.
//!
//! Phase one ([`normalize_menu`]) is a tolerant pass over the decoded JSON:
//! it fills structural defaults and coerces loose types (numeral strings,
//! comma-joined tags, empty strings) without ever failing. Phase two
//! ([`validate`]) strictly constructs a [`MenuDocument`] and rejects with a
//! [`CantaError::Schema`] naming the offending field path. Rejection only
//! happens at the strict boundary, so every coercion rule stays in one
//! place and is testable in isolation.

use serde_json::{json, Map, Value};
use tracing::debug;

use canta_core::menu::{MenuDocument, MenuItem, Price, SchemaTag, Section, Size};
use canta_core::CantaError;

use crate::money::{coerce_size_value, normalize_money};

/// Parse raw model output into a validated document.
///
/// Strips a markdown ```json fence if present, decodes, then runs both
/// validation phases. Idempotent for documents that are already valid.
pub fn parse_and_validate(raw: &str) -> Result<MenuDocument, CantaError> {
    let cleaned = strip_code_fence(raw);
    let mut data: Value =
        serde_json::from_str(cleaned).map_err(|e| CantaError::Decode(e.to_string()))?;
    normalize_menu(&mut data);
    validate(&data)
}

/// Remove a leading ```json marker and trailing ``` marker, if present.
fn strip_code_fence(raw: &str) -> &str {
    let mut cleaned = raw.trim();
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Tolerant normalization pass. No-op for non-objects; upstream callers
/// are expected to have decoded an object already.
pub fn normalize_menu(data: &mut Value) {
    let Some(obj) = data.as_object_mut() else {
        return;
    };

    if !obj.contains_key("source") {
        obj.insert("source".to_string(), json!("Unknown"));
    }
    if !obj.contains_key("sections") {
        obj.insert("sections".to_string(), json!([]));
    }
    if !obj.contains_key("schema") {
        obj.insert(
            "schema".to_string(),
            serde_json::to_value(SchemaTag::default()).unwrap_or(Value::Null),
        );
    }
    if !obj.contains_key("meta") {
        obj.insert("meta".to_string(), json!({}));
    }

    if let Some(sections) = obj.get_mut("sections").and_then(Value::as_array_mut) {
        for section in sections {
            normalize_section(section);
        }
    }
}

fn normalize_section(section: &mut Value) {
    let Some(sec) = section.as_object_mut() else {
        return;
    };

    trim_to_null(sec, "name");
    trim_to_null(sec, "time");

    if !sec.contains_key("items") {
        sec.insert("items".to_string(), json!([]));
    }
    if let Some(items) = sec.get_mut("items").and_then(Value::as_array_mut) {
        for item in items {
            normalize_item(item);
        }
    }
}

fn normalize_item(item: &mut Value) {
    let Some(it) = item.as_object_mut() else {
        return;
    };

    trim_to_null(it, "name");
    trim_to_null(it, "desc");

    // Price: synthesize the full record when absent, otherwise run the
    // money normalizer over whatever arrived.
    match it.get_mut("price") {
        None => {
            it.insert("price".to_string(), json!({"value": null, "currency": "MYR"}));
        }
        Some(Value::Object(price)) => {
            if let Some(value) = price.get("value") {
                let normalized = normalize_money(value);
                price.insert("value".to_string(), json!(normalized));
            }
            if !price.contains_key("currency") {
                price.insert("currency".to_string(), json!("MYR"));
            }
        }
        Some(_) => {}
    }

    match it.get_mut("size") {
        None => {
            it.insert("size".to_string(), json!({"value": null, "unit": null}));
        }
        Some(Value::Object(size)) => {
            if let Some(value) = size.get("value") {
                if !value.is_null() {
                    let coerced = coerce_size_value(value);
                    size.insert("value".to_string(), json!(coerced));
                }
            }
            if let Some(Value::String(unit)) = size.get("unit") {
                let trimmed = unit.trim();
                let coerced = if trimmed.is_empty() {
                    Value::Null
                } else {
                    json!(trimmed)
                };
                size.insert("unit".to_string(), coerced);
            }
        }
        Some(_) => {}
    }

    if let Some(tags) = it.get_mut("tags") {
        let normalized: Option<Vec<String>> = match tags.take() {
            Value::String(s) => Some(
                s.split(',')
                    .map(|t| t.trim().to_string())
                    .filter(|t| !t.is_empty())
                    .collect(),
            ),
            Value::Array(arr) => Some(
                arr.into_iter()
                    .map(|t| match t {
                        Value::String(s) => s.trim().to_string(),
                        other => other.to_string(),
                    })
                    .filter(|t| !t.is_empty())
                    .collect(),
            ),
            other => {
                *tags = other;
                None
            }
        };
        if let Some(list) = normalized {
            if list.is_empty() {
                // All entries trimmed away; unset rather than [].
                debug!("tags field collapsed to unset during normalization");
                *tags = Value::Null;
            } else {
                *tags = json!(list);
            }
        }
    }

    if !it.contains_key("extras") {
        it.insert("extras".to_string(), json!({}));
    }
}

/// Trim a string field in place, coercing empty to null. Non-string values
/// are left for the strict phase to judge.
fn trim_to_null(obj: &mut Map<String, Value>, key: &str) {
    if let Some(Value::String(s)) = obj.get(key) {
        let trimmed = s.trim();
        let coerced = if trimmed.is_empty() {
            Value::Null
        } else {
            Value::String(trimmed.to_string())
        };
        obj.insert(key.to_string(), coerced);
    }
}

/// Strict construction of a [`MenuDocument`] from normalized JSON.
///
/// Unknown top-level keys are ignored. The schema tag is forced to the
/// canonical `canta.menu/1.0` regardless of what the input carried.
pub fn validate(data: &Value) -> Result<MenuDocument, CantaError> {
    let obj = data
        .as_object()
        .ok_or_else(|| CantaError::schema("", "top-level value is not an object"))?;

    let source = match obj.get("source") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => {
            return Err(CantaError::schema("source", "missing required field"))
        }
        Some(_) => return Err(CantaError::schema("source", "expected a string")),
    };

    let sections_value = obj
        .get("sections")
        .ok_or_else(|| CantaError::schema("sections", "missing required field"))?;
    let sections_array = sections_value
        .as_array()
        .ok_or_else(|| CantaError::schema("sections", "expected an array"))?;

    let mut sections = Vec::with_capacity(sections_array.len());
    for (i, section) in sections_array.iter().enumerate() {
        sections.push(validate_section(section, &format!("sections[{i}]"))?);
    }

    let meta = match obj.get("meta") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => return Err(CantaError::schema("meta", "expected an object")),
    };

    Ok(MenuDocument {
        source,
        sections,
        meta,
        schema: SchemaTag::default(),
    })
}

fn validate_section(value: &Value, path: &str) -> Result<Section, CantaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CantaError::schema(path, "expected an object"))?;

    let name = optional_string(obj, "name", path)?;
    let time = optional_string(obj, "time", path)?;

    let items = match obj.get("items") {
        Some(Value::Array(arr)) => {
            let mut items = Vec::with_capacity(arr.len());
            for (i, item) in arr.iter().enumerate() {
                items.push(validate_item(item, &format!("{path}.items[{i}]"))?);
            }
            items
        }
        Some(Value::Null) | None => Vec::new(),
        Some(_) => return Err(CantaError::schema(format!("{path}.items"), "expected an array")),
    };

    Ok(Section { name, time, items })
}

fn validate_item(value: &Value, path: &str) -> Result<MenuItem, CantaError> {
    let obj = value
        .as_object()
        .ok_or_else(|| CantaError::schema(path, "expected an object"))?;

    let name = match obj.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            return Err(CantaError::schema(
                format!("{path}.name"),
                "missing required field `name`",
            ))
        }
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.name"), "expected a string"))
        }
    };

    let price = match obj.get("price") {
        Some(Value::Object(price)) => validate_price(price, &format!("{path}.price"))?,
        Some(Value::Null) | None => {
            return Err(CantaError::schema(
                format!("{path}.price"),
                "missing required field `price`",
            ))
        }
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.price"), "expected an object"))
        }
    };

    let size = match obj.get("size") {
        Some(Value::Object(size)) => validate_size(size, &format!("{path}.size"))?,
        Some(Value::Null) | None => Size::default(),
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.size"), "expected an object"))
        }
    };

    let desc = optional_string(obj, "desc", path)?;

    let tags = match obj.get("tags") {
        Some(Value::Array(arr)) => {
            let mut tags = Vec::with_capacity(arr.len());
            for (i, tag) in arr.iter().enumerate() {
                match tag {
                    Value::String(s) => tags.push(s.clone()),
                    _ => {
                        return Err(CantaError::schema(
                            format!("{path}.tags[{i}]"),
                            "expected a string",
                        ))
                    }
                }
            }
            if tags.is_empty() {
                None
            } else {
                Some(tags)
            }
        }
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(CantaError::schema(
                format!("{path}.tags"),
                "expected an array of strings",
            ))
        }
    };

    let extras = match obj.get("extras") {
        Some(Value::Object(map)) => map.clone(),
        Some(Value::Null) | None => Map::new(),
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.extras"), "expected an object"))
        }
    };

    Ok(MenuItem {
        name,
        price,
        size,
        desc,
        tags,
        extras,
    })
}

fn validate_price(obj: &Map<String, Value>, path: &str) -> Result<Price, CantaError> {
    let value = match obj.get("value") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.value"), "expected a number"))
        }
    };
    let currency = match obj.get("currency") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => "MYR".to_string(),
        Some(_) => {
            return Err(CantaError::schema(
                format!("{path}.currency"),
                "expected a string",
            ))
        }
    };
    Ok(Price { value, currency })
}

fn validate_size(obj: &Map<String, Value>, path: &str) -> Result<Size, CantaError> {
    let value = match obj.get("value") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.value"), "expected a number"))
        }
    };
    let unit = match obj.get("unit") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Null) | None => None,
        Some(_) => {
            return Err(CantaError::schema(format!("{path}.unit"), "expected a string"))
        }
    };
    Ok(Size { value, unit })
}

fn optional_string(
    obj: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, CantaError> {
    match obj.get(key) {
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(trimmed.to_string()))
            }
        }
        Some(Value::Null) | None => Ok(None),
        Some(_) => Err(CantaError::schema(
            format!("{path}.{key}"),
            "expected a string or null",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fills_structural_defaults() {
        let doc = parse_and_validate(r#"{"source": "Cafe"}"#).unwrap();
        assert_eq!(doc.source, "Cafe");
        assert!(doc.sections.is_empty());
        assert!(doc.meta.is_empty());
        assert_eq!(doc.schema.name, "canta.menu");
    }

    #[test]
    fn missing_source_defaults_to_unknown() {
        let doc = parse_and_validate(r#"{"sections": []}"#).unwrap();
        assert_eq!(doc.source, "Unknown");
    }

    #[test]
    fn strips_json_code_fence() {
        let raw = "```json\n{\"source\": \"Cafe\", \"sections\": []}\n```";
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(doc.source, "Cafe");
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let err = parse_and_validate("not json at all").unwrap_err();
        assert!(matches!(err, CantaError::Decode(_)));
    }

    #[test]
    fn non_object_top_level_is_a_schema_error() {
        let err = parse_and_validate("[1, 2, 3]").unwrap_err();
        assert!(matches!(err, CantaError::Schema { .. }));
    }

    #[test]
    fn item_missing_name_fails_with_field_path() {
        let raw = r#"{"source": "Cafe", "sections": [{"items": [{"price": {"value": 5}}]}]}"#;
        let err = parse_and_validate(raw).unwrap_err();
        match err {
            CantaError::Schema { path, reason } => {
                assert_eq!(path, "sections[0].items[0].name");
                assert!(reason.contains("name"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn price_string_is_normalized() {
        let raw = r#"{"source": "Cafe", "sections": [{"name": "Mains", "items": [
            {"name": "Nasi Lemak", "price": {"value": "RM 12"}}
        ]}]}"#;
        let doc = parse_and_validate(raw).unwrap();
        let item = &doc.sections[0].items[0];
        assert_eq!(item.price.value, Some(12.0));
        assert_eq!(item.price.currency, "MYR");
        assert_eq!(item.size, Size::default());
        assert!(item.extras.is_empty());
    }

    #[test]
    fn comma_joined_tags_are_split() {
        let raw = r#"{"source": "Cafe", "sections": [{"items": [
            {"name": "Laksa", "price": {"value": 9}, "tags": "spicy, halal, new"}
        ]}]}"#;
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(
            doc.sections[0].items[0].tags,
            Some(vec!["spicy".to_string(), "halal".to_string(), "new".to_string()])
        );
    }

    #[test]
    fn empty_tags_become_unset() {
        for tags in [json!(""), json!([]), json!(["", "  "])] {
            let mut data = json!({"source": "Cafe", "sections": [{"items": [
                {"name": "Laksa", "price": {"value": 9}, "tags": tags}
            ]}]});
            normalize_menu(&mut data);
            let doc = validate(&data).unwrap();
            assert_eq!(doc.sections[0].items[0].tags, None);
        }
    }

    #[test]
    fn empty_section_name_coerced_to_unset() {
        let raw = r#"{"source": "Cafe", "sections": [{"name": "  ", "time": "breakfast", "items": []}]}"#;
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(doc.sections[0].name, None);
        assert_eq!(doc.sections[0].time.as_deref(), Some("breakfast"));
    }

    #[test]
    fn size_value_coercion_failure_is_unset() {
        let raw = r#"{"source": "Cafe", "sections": [{"items": [
            {"name": "Kopi", "price": {"value": 2.5}, "size": {"value": "large", "unit": " ml "}}
        ]}]}"#;
        let doc = parse_and_validate(raw).unwrap();
        let size = &doc.sections[0].items[0].size;
        assert_eq!(size.value, None);
        assert_eq!(size.unit.as_deref(), Some("ml"));
    }

    #[test]
    fn unknown_top_level_keys_are_ignored() {
        let raw = r#"{"source": "Cafe", "sections": [], "confidence": 0.9, "pages": 3}"#;
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(doc.source, "Cafe");
    }

    #[test]
    fn foreign_schema_tag_is_forced_to_canonical() {
        let raw = r#"{"source": "Cafe", "sections": [], "schema": {"name": "other", "version": "9"}}"#;
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(doc.schema, SchemaTag::default());
    }

    #[test]
    fn meta_passes_through_unknown_keys() {
        let raw = r#"{"source": "Cafe", "sections": [], "meta": {"service_charge_note": true, "x": null}}"#;
        let doc = parse_and_validate(raw).unwrap();
        assert_eq!(doc.meta["service_charge_note"], json!(true));
        assert!(doc.meta.contains_key("x"));
    }

    #[test]
    fn normalization_is_idempotent_for_valid_documents() {
        let raw = r#"{"source": "Cafe Menu", "sections": [{"name": "Mains", "time": null, "items": [
            {"name": "Nasi Lemak", "price": {"value": "RM 12"}, "desc": " fragrant rice ",
             "tags": ["spicy", "halal"], "extras": {"second_price": 15}}
        ]}], "meta": {"service_charge_note": false}}"#;
        let once = parse_and_validate(raw).unwrap();
        let again = parse_and_validate(&serde_json::to_string(&once).unwrap()).unwrap();
        assert_eq!(once, again);
    }
}
