//! LinkedIn profile export → sectioned plain text.
//!
//! The export is already structured, so it is flattened under uppercase
//! headings (EXPERIENCE, EDUCATION, SKILLS, ...) that the format detector
//! recognizes. Bullets use `•` so the text is not mistaken for Markdown.
//! Field names follow the LinkedIn data export; common camelCase variants are
//! accepted too.

use serde_json::Value;

use super::{ExtractedText, ExtractionError};
use crate::extraction::dates::format_date_range;
use crate::extraction::raw::{raw_items, RawItem, RawRecord};

pub const LINKEDIN_CONFIDENCE: f64 = 0.95;

pub fn flatten_export(export: &Value) -> Result<ExtractedText, ExtractionError> {
    let Value::Object(fields) = export else {
        return Err(ExtractionError::LinkedIn(
            "expected a JSON object at the top level".to_string(),
        ));
    };
    let profile = RawRecord(fields);
    let mut out = Vec::new();

    let name = profile.text(&["fullName", "name"]).or_else(|| {
        let first = profile.text(&["firstName", "first_name"]).unwrap_or_default();
        let last = profile.text(&["lastName", "last_name"]).unwrap_or_default();
        Some(format!("{first} {last}").trim().to_string()).filter(|n| !n.is_empty())
    });
    for line in [
        name,
        profile.text(&["headline", "title"]),
        profile.text(&["locationName", "geoLocationName", "location"]),
        profile.text(&["emailAddress", "email"]),
        profile.text(&["phoneNumber", "phone"]),
    ]
    .into_iter()
    .flatten()
    {
        out.push(line);
    }

    if let Some(summary) = profile.text(&["summary", "about"]) {
        push_section(&mut out, "SUMMARY", vec![summary]);
    }

    push_section(
        &mut out,
        "EXPERIENCE",
        entries(&profile, &["positions", "experience", "Positions"], position_lines),
    );
    push_section(
        &mut out,
        "EDUCATION",
        entries(&profile, &["educations", "education", "Education"], education_lines),
    );
    push_section(
        &mut out,
        "PROJECTS",
        entries(&profile, &["projects", "Projects"], project_lines),
    );
    push_section(
        &mut out,
        "CERTIFICATIONS",
        entries(&profile, &["certifications", "Certifications"], certification_lines),
    );
    push_section(
        &mut out,
        "LANGUAGES",
        entries(&profile, &["languages", "Languages"], language_lines),
    );

    let skills = skill_names(&profile);
    if !skills.is_empty() {
        push_section(&mut out, "SKILLS", vec![skills.join(", ")]);
    }

    Ok(ExtractedText::new(out.join("\n"), LINKEDIN_CONFIDENCE))
}

fn push_section(out: &mut Vec<String>, heading: &str, lines: Vec<String>) {
    if lines.is_empty() {
        return;
    }
    out.push(String::new());
    out.push(heading.to_string());
    out.extend(lines);
}

fn entries(
    profile: &RawRecord<'_>,
    aliases: &[&str],
    render: fn(RawRecord<'_>) -> Vec<String>,
) -> Vec<String> {
    let Some(items) = raw_items(profile.value(aliases)) else {
        return Vec::new();
    };
    items
        .into_iter()
        .flat_map(|item| match item {
            RawItem::Record(record) => render(record),
            RawItem::Text(text) => vec![text.to_string()],
            RawItem::Opaque => Vec::new(),
        })
        .collect()
}

fn position_lines(position: RawRecord<'_>) -> Vec<String> {
    let title = position.text(&["title", "position"]);
    let company = position.text(&["companyName", "company"]);
    let heading = match (title, company) {
        (Some(title), Some(company)) => Some(format!("{title} at {company}")),
        (title, company) => title.or(company),
    };
    let mut lines: Vec<String> = heading.into_iter().collect();
    lines.extend(dates_line(&position));
    lines.extend(position.text(&["locationName", "location"]));
    lines.extend(position.list(&["description"]).into_iter().map(|l| format!("• {l}")));
    lines
}

fn education_lines(education: RawRecord<'_>) -> Vec<String> {
    let mut lines: Vec<String> = education
        .text(&["schoolName", "school"])
        .into_iter()
        .collect();
    let degree = [
        education.text(&["degreeName", "degree"]),
        education.text(&["fieldOfStudy", "field"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    if !degree.is_empty() {
        lines.push(degree);
    }
    lines.extend(dates_line(&education));
    lines
}

fn project_lines(project: RawRecord<'_>) -> Vec<String> {
    let mut lines: Vec<String> = project.text(&["title", "name"]).into_iter().collect();
    lines.extend(project.text(&["description"]));
    lines.extend(project.text(&["url"]));
    lines
}

fn certification_lines(certification: RawRecord<'_>) -> Vec<String> {
    match (
        certification.text(&["name", "title"]),
        certification.text(&["authority", "issuer"]),
    ) {
        (Some(name), Some(issuer)) => vec![format!("{name} ({issuer})")],
        (name, issuer) => name.or(issuer).into_iter().collect(),
    }
}

fn language_lines(language: RawRecord<'_>) -> Vec<String> {
    match (
        language.text(&["name", "language"]),
        language.text(&["proficiency"]),
    ) {
        (Some(name), Some(level)) => vec![format!("{name}: {level}")],
        (name, _) => name.into_iter().collect(),
    }
}

fn skill_names(profile: &RawRecord<'_>) -> Vec<String> {
    raw_items(profile.value(&["skills", "Skills"]))
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            RawItem::Record(record) => record.text(&["name", "skill"]),
            RawItem::Text(text) => Some(text.to_string()),
            RawItem::Opaque => None,
        })
        .collect()
}

fn dates_line(record: &RawRecord<'_>) -> Option<String> {
    let period = record.get("timePeriod");
    let start = record
        .get("startDate")
        .or_else(|| period.and_then(|p| p.get("startDate")));
    let end = record
        .get("endDate")
        .or_else(|| period.and_then(|p| p.get("endDate")));
    let range = format_date_range(&export_date(start), &export_date(end));
    Some(range).filter(|r| !r.is_empty())
}

/// `{"month": 3, "year": 2020}` → `"03/2020"`, `{"year": 2020}` → `"2020"`.
fn export_date(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Object(date)) => {
            let year = date.get("year").and_then(Value::as_u64);
            let month = date.get("month").and_then(Value::as_u64);
            match (month, year) {
                (Some(month), Some(year)) => format!("{month:02}/{year}"),
                (None, Some(year)) => year.to_string(),
                _ => String::new(),
            }
        }
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::format::{detect_text_format, TextFormat};
    use serde_json::json;

    #[test]
    fn test_flattens_full_export() {
        let export = json!({
            "firstName": "Jane",
            "lastName": "Doe",
            "headline": "Staff Engineer",
            "emailAddress": "jane@example.com",
            "summary": "Builds things.",
            "positions": [{
                "title": "Engineer",
                "companyName": "Acme",
                "timePeriod": {"startDate": {"month": 3, "year": 2020}},
                "description": "Built the API\nLed migrations"
            }],
            "educations": [{
                "schoolName": "MIT",
                "degreeName": "BSc",
                "fieldOfStudy": "Computer Science",
                "startDate": {"year": 2012},
                "endDate": {"year": 2016}
            }],
            "skills": [{"name": "Rust"}, "Go"]
        });
        let extracted = flatten_export(&export).unwrap();
        let text = extracted.text;
        assert!(text.starts_with("Jane Doe\nStaff Engineer\njane@example.com"));
        assert!(text.contains("EXPERIENCE\nEngineer at Acme\n03/2020 to Present\n• Built the API\n• Led migrations"));
        assert!(text.contains("EDUCATION\nMIT\nBSc, Computer Science\n2012 to 2016"));
        assert!(text.contains("SKILLS\nRust, Go"));
        assert_eq!(detect_text_format(&text), TextFormat::Structured);
        assert_eq!(extracted.confidence, LINKEDIN_CONFIDENCE);
    }

    #[test]
    fn test_empty_sections_are_skipped() {
        let extracted = flatten_export(&json!({"fullName": "Jane", "positions": []})).unwrap();
        assert_eq!(extracted.text, "Jane");
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(matches!(
            flatten_export(&json!(["a"])),
            Err(ExtractionError::LinkedIn(_))
        ));
    }

    #[test]
    fn test_export_date_shapes() {
        assert_eq!(export_date(Some(&json!({"year": 2020}))), "2020");
        assert_eq!(export_date(Some(&json!({"month": 11, "year": 2020}))), "11/2020");
        assert_eq!(export_date(Some(&json!("Jan 2020"))), "Jan 2020");
        assert_eq!(export_date(None), "");
    }
}
