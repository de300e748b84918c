//! The canonical empty Resume Document. This is the single source of truth for
//! the document's shape; defaults elsewhere are read out of it.

use serde_json::{json, Map, Value};

use crate::document::sections::SectionKey;

pub const DEFAULT_TEMPLATE: &str = "rhyhorn";
pub const DEFAULT_COLUMNS: i64 = 1;
pub const MAX_COLUMNS: i64 = 5;

/// A complete, renderable, empty document.
pub fn canonical_document() -> Value {
    json!({
        "basics": default_basics(),
        "sections": default_sections(),
        "metadata": default_metadata(),
    })
}

pub fn default_basics() -> Value {
    json!({
        "name": "",
        "headline": "",
        "email": "",
        "phone": "",
        "location": "",
        "url": default_link(),
        "customFields": [],
        "picture": {
            "url": "",
            "size": 64,
            "aspectRatio": 1,
            "borderRadius": 0,
            "effects": {
                "hidden": false,
                "border": false,
                "grayscale": false
            }
        }
    })
}

pub fn default_metadata() -> Value {
    json!({
        "template": DEFAULT_TEMPLATE,
        "layout": default_layout(),
        "css": {
            "value": "* {\n\toutline: 1px solid #000;\n\toutline-offset: 4px;\n}",
            "visible": false
        },
        "page": {
            "margin": 18,
            "format": "a4",
            "options": {
                "breakLine": true,
                "pageNumbers": true
            }
        },
        "theme": {
            "background": "#ffffff",
            "text": "#000000",
            "primary": "#dc2626"
        },
        "typography": {
            "font": {
                "family": "IBM Plex Serif",
                "subset": "latin",
                "variants": ["regular", "italic", "600"],
                "size": 14
            },
            "lineHeight": 1.5,
            "hideIcons": false,
            "underlineLinks": true
        },
        "notes": "",
        "aiGenerated": false,
        "aiGeneratedAt": "",
        "needsReview": false,
        "confidence": 0.0
    })
}

/// Pages → columns → section keys.
pub fn default_layout() -> Value {
    json!([[
        ["profiles", "summary", "experience", "education", "projects", "volunteer", "references"],
        ["skills", "interests", "certifications", "awards", "publications", "languages"]
    ]])
}

pub fn default_link() -> Value {
    json!({ "label": "", "href": "" })
}

pub fn default_sections() -> Value {
    let sections: Map<String, Value> = SectionKey::ALL
        .into_iter()
        .map(|key| (key.as_str().to_string(), default_section(key)))
        .collect();
    Value::Object(sections)
}

/// Default value of one section, including `items: []` / `content: ""`.
pub fn default_section(key: SectionKey) -> Value {
    match key {
        SectionKey::Custom => json!({}),
        SectionKey::Summary => {
            let mut section = section_header(key);
            section.insert("content".to_string(), json!(""));
            Value::Object(section)
        }
        _ => {
            let mut section = section_header(key);
            section.insert("items".to_string(), json!([]));
            Value::Object(section)
        }
    }
}

/// The header fields every non-custom section shares.
pub fn section_header(key: SectionKey) -> Map<String, Value> {
    let header = json!({
        "name": key.display_name(),
        "columns": DEFAULT_COLUMNS,
        "separateLinks": true,
        "visible": key.default_visible(),
        "id": key.as_str(),
    });
    match header {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
