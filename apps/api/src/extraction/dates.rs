use serde_json::Value;

/// Formats a start/end pair for display.
///
/// - both empty               → `""`
/// - end empty or "present"   → `"<start> to Present"`
/// - otherwise                → `"<start> to <end>"`
///
/// A missing start collapses to just the end (`"2021"`) rather than a
/// dangling `" to 2021"`. With no start and an open end there is nothing to
/// show, so the result is `""`.
pub fn format_date_range(start: &str, end: &str) -> String {
    let start = start.trim();
    let end = end.trim();
    let end = if end.eq_ignore_ascii_case("present") || end.eq_ignore_ascii_case("current") {
        ""
    } else {
        end
    };

    match (start.is_empty(), end.is_empty()) {
        (true, true) => String::new(),
        (true, false) => end.to_string(),
        (false, true) => format!("{start} to Present"),
        (false, false) => format!("{start} to {end}"),
    }
}

/// Same as `format_date_range` for loosely-typed JSON values.
pub fn format_date_value_range(start: Option<&Value>, end: Option<&Value>) -> String {
    format_date_range(&date_text(start), &date_text(end))
}

/// Strings pass through, numbers and booleans are printed, everything else is empty.
pub fn date_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}
