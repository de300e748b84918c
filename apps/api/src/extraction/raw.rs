//! Raw extracted items: what the model hands back before normalization.
//!
//! Every entry of an extracted section array is classified once into a
//! `RawItem`; the per-section mappers then match on it exhaustively instead of
//! looking up properties ad hoc.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
pub enum RawItem<'a> {
    /// A JSON object with (possibly aliased) fields.
    Record(RawRecord<'a>),
    /// A bare string, e.g. `"MIT"` in an education list.
    Text(&'a str),
    /// Anything else: numbers, booleans, nulls, nested arrays.
    Opaque,
}

impl<'a> RawItem<'a> {
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Object(fields) => RawItem::Record(RawRecord(fields)),
            Value::String(text) if !text.trim().is_empty() => RawItem::Text(text.trim()),
            _ => RawItem::Opaque,
        }
    }
}

/// Returns the entries of `value` when it is an array, `None` otherwise.
pub fn raw_items(value: Option<&Value>) -> Option<Vec<RawItem<'_>>> {
    match value {
        Some(Value::Array(entries)) => Some(entries.iter().map(RawItem::classify).collect()),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a>(pub &'a Map<String, Value>);

impl<'a> RawRecord<'a> {
    pub fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.get(key)
    }

    /// First alias holding a non-empty string.
    pub fn text(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| match self.0.get(*alias) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
    }

    /// Like `text`, but also accepts numbers (GPA 3.8 → "3.8").
    pub fn scalar_text(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| match self.0.get(*alias) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
    }

    /// First alias holding a link, either a bare string or a `{"href": ..}`
    /// object as found in already-normalized items.
    pub fn link(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|alias| {
            let href = match self.0.get(*alias)? {
                Value::String(s) => s.as_str(),
                Value::Object(link) => link.get("href")?.as_str()?,
                _ => return None,
            };
            let href = href.trim();
            (!href.is_empty()).then(|| href.to_string())
        })
    }

    /// First alias holding a value that is not null.
    pub fn value(&self, aliases: &[&str]) -> Option<&'a Value> {
        aliases
            .iter()
            .find_map(|alias| self.0.get(*alias).filter(|v| !v.is_null()))
    }

    /// First alias holding a non-empty list of strings. A single string is
    /// split into lines with bullet markers stripped.
    pub fn list(&self, aliases: &[&str]) -> Vec<String> {
        self.first_list(aliases, |text| {
            text.lines()
                .map(clean_list_entry)
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    /// Like `list`, but a single string is split on commas as well as lines.
    pub fn keywords(&self, aliases: &[&str]) -> Vec<String> {
        self.first_list(aliases, |text| {
            text.split([',', '\n'])
                .map(clean_list_entry)
                .filter(|s| !s.is_empty())
                .collect()
        })
    }

    fn first_list(&self, aliases: &[&str], split: impl Fn(&str) -> Vec<String>) -> Vec<String> {
        for alias in aliases {
            let items = match self.0.get(*alias) {
                Some(Value::Array(entries)) => entries
                    .iter()
                    .filter_map(Value::as_str)
                    .map(clean_list_entry)
                    .filter(|s| !s.is_empty())
                    .collect(),
                Some(Value::String(text)) => split(text),
                _ => Vec::new(),
            };
            if !items.is_empty() {
                return items;
            }
        }
        Vec::new()
    }
}

fn clean_list_entry(entry: &str) -> String {
    entry
        .trim()
        .trim_start_matches(['-', '*', '•'])
        .trim()
        .to_string()
}
