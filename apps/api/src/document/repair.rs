//! Section shape repair — re-asserts every structural invariant of a Resume Document.
//!
//! Accepts any JSON value (freshly normalized output, a row written by an older
//! code path, or outright garbage) and returns a document that satisfies the
//! schema. The pass is total and a fixed point: repairing a repaired document
//! yields the same value, ids included.
//!
//! Rules, per fixed section key:
//! - missing / null / scalar      → canonical default section
//! - array                        → default header wrapping the array as `items`
//! - object                       → merged onto the default header, `items` forced to an array
//! - every item                   → keeps its fields, gains a valid unique `id` and a boolean `visible`
//! - `custom`                     → `{}` unless already an object
//!
//! `basics` and `metadata` are conformed field-by-field against the template:
//! a field of the wrong JSON type falls back to the template value, nested
//! objects are conformed recursively, unknown fields are kept.

use serde_json::{json, Map, Value};

use crate::document::ids::ItemIds;
use crate::document::sections::SectionKey;
use crate::document::template::{
    canonical_document, default_basics, default_layout, default_link, default_metadata,
    default_section, section_header, DEFAULT_COLUMNS, MAX_COLUMNS,
};

/// Result of a read-path repair.
#[derive(Debug, Clone)]
pub struct ReadRepair {
    pub document: Value,
    /// False when the stored value already satisfied every invariant.
    pub changed: bool,
}

/// Repairs a document loaded from storage and reports whether anything moved.
/// Callers gate this on `metadata.aiGenerated`.
pub fn repair_document_on_read(document: Value) -> ReadRepair {
    let repaired = repair_document(&document);
    let changed = repaired != document;
    ReadRepair {
        document: repaired,
        changed,
    }
}

pub fn repair_document(candidate: &Value) -> Value {
    let Some(document) = candidate.as_object() else {
        return canonical_document();
    };

    let mut ids = ItemIds::new();
    let mut repaired = document.clone();
    repaired.insert("basics".to_string(), repair_basics(document.get("basics")));
    repaired.insert(
        "sections".to_string(),
        repair_sections(document.get("sections"), &mut ids),
    );
    repaired.insert(
        "metadata".to_string(),
        repair_metadata(document.get("metadata")),
    );
    Value::Object(repaired)
}

fn repair_basics(value: Option<&Value>) -> Value {
    conform(value, &default_basics())
}

fn repair_metadata(value: Option<&Value>) -> Value {
    let mut metadata = conform(value, &default_metadata());
    if let Value::Object(fields) = &mut metadata {
        if !is_layout(fields.get("layout")) {
            fields.insert("layout".to_string(), default_layout());
        }
        let confidence = fields.get("confidence").and_then(Value::as_f64);
        if let Some(confidence) = confidence {
            if !(0.0..=1.0).contains(&confidence) {
                fields.insert("confidence".to_string(), json!(confidence.clamp(0.0, 1.0)));
            }
        }
    }
    metadata
}

fn repair_sections(value: Option<&Value>, ids: &mut ItemIds) -> Value {
    let mut sections = match value {
        Some(Value::Object(existing)) => existing.clone(),
        _ => Map::new(),
    };
    for key in SectionKey::ALL {
        let repaired = repair_section(key, sections.get(key.as_str()), ids);
        sections.insert(key.as_str().to_string(), repaired);
    }
    Value::Object(sections)
}

fn repair_section(key: SectionKey, value: Option<&Value>, ids: &mut ItemIds) -> Value {
    match key {
        SectionKey::Custom => match value {
            Some(custom @ Value::Object(_)) => custom.clone(),
            _ => json!({}),
        },
        SectionKey::Summary => repair_summary(value),
        _ => repair_item_section(key, value, ids),
    }
}

fn repair_summary(value: Option<&Value>) -> Value {
    let default = default_section(SectionKey::Summary);
    let mut summary = match value {
        Some(Value::Object(_)) => conform(value, &default),
        Some(Value::String(text)) => with_content(&default, text.clone()),
        Some(Value::Array(parts)) => {
            let content = parts
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| format!("<p>{part}</p>"))
                .collect::<String>();
            with_content(&default, content)
        }
        _ => default,
    };
    if let Value::Object(fields) = &mut summary {
        normalize_columns(fields);
    }
    summary
}

fn with_content(default: &Value, content: String) -> Value {
    let mut summary = default.clone();
    if let Value::Object(fields) = &mut summary {
        fields.insert("content".to_string(), Value::String(content));
    }
    summary
}

fn repair_item_section(key: SectionKey, value: Option<&Value>, ids: &mut ItemIds) -> Value {
    let no_items: &[Value] = &[];

    let (mut section, items) = match value {
        Some(Value::Array(items)) => {
            let mut header = section_header(key);
            header.insert(
                "visible".to_string(),
                Value::Bool(!items.is_empty() && key.default_visible()),
            );
            (header, items.as_slice())
        }
        Some(Value::Object(fields)) => {
            let header = match conform(value, &Value::Object(section_header(key))) {
                Value::Object(merged) => merged,
                _ => section_header(key),
            };
            let items = match fields.get("items") {
                Some(Value::Array(items)) => items.as_slice(),
                _ => no_items,
            };
            (header, items)
        }
        _ => (section_header(key), no_items),
    };

    normalize_columns(&mut section);
    section.insert(
        "items".to_string(),
        Value::Array(repair_items(key, items, ids)),
    );
    Value::Object(section)
}

fn repair_items(key: SectionKey, items: &[Value], ids: &mut ItemIds) -> Vec<Value> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(fields) => {
                let mut fields = fields.clone();
                let id = ids.claim(fields.get("id").and_then(Value::as_str));
                fields.insert("id".to_string(), Value::String(id));
                if !matches!(fields.get("visible"), Some(Value::Bool(_))) {
                    fields.insert("visible".to_string(), Value::Bool(true));
                }
                if key.has_links() {
                    let url = repair_link(fields.get("url"));
                    fields.insert("url".to_string(), url);
                }
                Value::Object(fields)
            }
            _ => placeholder_item(key, index, ids),
        })
        .collect()
}

fn placeholder_item(key: SectionKey, index: usize, ids: &mut ItemIds) -> Value {
    let mut item = json!({
        "id": ids.fresh(),
        "visible": true,
        "name": format!("{} Item {}", key.display_name(), index + 1),
    });
    if key.has_links() {
        item["url"] = default_link();
    }
    item
}

fn repair_link(value: Option<&Value>) -> Value {
    match value {
        Some(Value::String(href)) => json!({ "label": "", "href": href }),
        _ => conform(value, &default_link()),
    }
}

/// `columns` must be an integer in 1..=5.
fn normalize_columns(section: &mut Map<String, Value>) {
    let columns = match section.get("columns") {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(c) if (1..=MAX_COLUMNS).contains(&c) => return,
            Some(c) => c,
            None => n.as_f64().map(|f| f.round() as i64).unwrap_or(DEFAULT_COLUMNS),
        },
        _ => DEFAULT_COLUMNS,
    };
    section.insert("columns".to_string(), json!(columns.clamp(1, MAX_COLUMNS)));
}

fn is_layout(value: Option<&Value>) -> bool {
    let Some(Value::Array(pages)) = value else {
        return false;
    };
    !pages.is_empty()
        && pages.iter().all(|page| {
            page.as_array().is_some_and(|columns| {
                columns.iter().all(|column| {
                    column
                        .as_array()
                        .is_some_and(|keys| keys.iter().all(Value::is_string))
                })
            })
        })
}

/// Shapes `value` after `default`: same JSON type at every templated path,
/// template values filling gaps, extra fields passed through untouched.
fn conform(value: Option<&Value>, default: &Value) -> Value {
    match (default, value) {
        (Value::Object(defaults), Some(Value::Object(present))) => {
            let mut merged = present.clone();
            for (key, default_child) in defaults {
                merged.insert(key.clone(), conform(present.get(key), default_child));
            }
            Value::Object(merged)
        }
        (Value::String(_), Some(v @ Value::String(_)))
        | (Value::Bool(_), Some(v @ Value::Bool(_)))
        | (Value::Number(_), Some(v @ Value::Number(_)))
        | (Value::Array(_), Some(v @ Value::Array(_))) => v.clone(),
        (Value::Null, Some(v)) => v.clone(),
        _ => default.clone(),
    }
}
