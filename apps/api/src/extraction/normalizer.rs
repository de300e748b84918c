//! Schema normalization — maps a parsed model response onto the canonical document.
//!
//! Starts from the empty template (or from the repaired `resumeData` when the
//! model sent only that), fills basics and the item sections from
//! `extractedData`, stamps the AI metadata, and finishes with a full repair so
//! the output always satisfies the document schema.

use std::sync::LazyLock;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

use super::dates::format_date_value_range;
use super::profiles::{network_from_url, resolve_profile_icon, username_from_url};
use super::raw::{raw_items, RawItem, RawRecord};
use super::response::ParsedResponse;
use super::skills::group_skills;
use super::BuildOptions;
use crate::document::ids::{is_item_id, ItemIds};
use crate::document::items::{
    item_value, CertificationItem, EducationItem, ExperienceItem, LanguageItem, Link, ProfileItem,
    ProjectItem, SkillItem,
};
use crate::document::{canonical_document, repair_document, SectionKey};

/// Confidence recorded when the model did not report one.
pub const DEFAULT_CONFIDENCE: f64 = 0.85;
const MAX_EXPERIENCE_BULLETS: usize = 3;
const MAX_PROJECT_KEYWORDS: usize = 10;

const BASICS_FIELDS: [(&str, &[&str]); 5] = [
    ("name", &["name", "fullName", "full_name"]),
    ("headline", &["headline", "title", "jobTitle", "job_title"]),
    ("email", &["email", "emailAddress"]),
    ("phone", &["phone", "phoneNumber", "phone_number", "mobile"]),
    ("location", &["location", "address", "city"]),
];
const WEBSITE: &[&str] = &["website", "url", "portfolio"];
const SUMMARY: &[&str] = &["summary", "about", "objective", "profile"];

// Profile links that resumes usually list next to the contact details.
const PERSONAL_PROFILES: [(&str, &str); 5] = [
    ("linkedin", "LinkedIn"),
    ("github", "GitHub"),
    ("gitlab", "GitLab"),
    ("twitter", "Twitter"),
    ("website", "Website"),
];

const START_DATE: &[&str] = &["startDate", "start_date", "start", "from"];
const END_DATE: &[&str] = &["endDate", "end_date", "end", "to"];
const ITEM_DATE: &[&str] = &["date", "dates", "period", "duration", "year"];
const ISSUE_DATE: &[&str] = &["date", "issueDate", "issue_date", "issued", "year"];
const ITEM_URL: &[&str] = &["website", "url", "link", "href"];

// Markup the normalizer itself emits: paragraphs and flat bullet lists of
// already-escaped text. Anything else from the model is escaped.
static RE_SAFE_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:<p>[^<>]*</p>|<ul>(?:<li>[^<>]*</li>)+</ul>)+$").unwrap()
});

const PROFICIENCY_LEVELS: &[(&str, u8)] = &[
    ("native", 5),
    ("bilingual", 5),
    ("fluent", 4),
    ("professional", 4),
    ("advanced", 4),
    ("intermediate", 3),
    ("conversational", 2),
    ("basic", 1),
    ("elementary", 1),
    ("beginner", 1),
];

/// Normalizes against the current wall clock.
pub fn normalize_response(parsed: &ParsedResponse, options: &BuildOptions) -> Value {
    normalize_at(parsed, options, Utc::now())
}

/// Total and deterministic apart from fresh item ids.
pub fn normalize_at(parsed: &ParsedResponse, options: &BuildOptions, now: DateTime<Utc>) -> Value {
    let extracted = parsed
        .extracted_data
        .as_object()
        .filter(|data| !data.is_empty());

    let mut document = match (extracted, &parsed.resume_data) {
        (None, Some(resume)) => {
            debug!("No extracted data; normalizing from resumeData");
            repair_document(resume)
        }
        _ => canonical_document(),
    };

    if let Some(data) = extracted {
        let mut ids = ItemIds::new();
        let personal = data
            .get("personal")
            .and_then(Value::as_object)
            .map(RawRecord);

        if let Some(personal) = personal {
            apply_personal(&mut document, personal);
        }
        let summary = personal
            .and_then(|p| p.text(SUMMARY))
            .or_else(|| RawRecord(data).text(SUMMARY));
        if let Some(summary) = summary {
            set_summary(&mut document, &summary);
        }

        for (key, items) in map_sections(data, personal, &mut ids) {
            debug!(section = %key, count = items.len(), "Mapped section items");
            set_items(&mut document, key, items);
        }
    }

    apply_visibility(&mut document);
    apply_metadata(&mut document, parsed, options, now);
    repair_document(&document)
}

// ────────────────────────────────────────────────────────────────────────────
// Basics
// ────────────────────────────────────────────────────────────────────────────

fn apply_personal(document: &mut Value, personal: RawRecord<'_>) {
    let Some(basics) = document.get_mut("basics").and_then(Value::as_object_mut) else {
        return;
    };
    for (field, aliases) in BASICS_FIELDS {
        if let Some(value) = personal.text(aliases) {
            basics.insert(field.to_string(), Value::String(value));
        }
    }
    if let Some(href) = personal.link(WEBSITE) {
        basics.insert("url".to_string(), json!({"label": "", "href": href}));
    }
}

fn set_summary(document: &mut Value, text: &str) {
    let content = if is_safe_html(text) {
        text.to_string()
    } else {
        paragraph(text)
    };
    if let Some(summary) = document
        .pointer_mut("/sections/summary")
        .and_then(Value::as_object_mut)
    {
        summary.insert("content".to_string(), Value::String(content));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Sections present in `extractedData`, mapped to item JSON. Absent sections
/// are left untouched.
fn map_sections(
    data: &Map<String, Value>,
    personal: Option<RawRecord<'_>>,
    ids: &mut ItemIds,
) -> Vec<(SectionKey, Vec<Value>)> {
    let mut sections = Vec::new();

    if let Some(raw) = raw_items(data.get("education")) {
        sections.push((SectionKey::Education, map_each(raw, ids, education_item)));
    }
    if let Some(raw) = raw_items(data.get("experience").or_else(|| data.get("work"))) {
        sections.push((SectionKey::Experience, map_each(raw, ids, experience_item)));
    }
    if let Some(raw) = raw_items(data.get("projects")) {
        sections.push((SectionKey::Projects, map_each(raw, ids, project_item)));
    }
    if let Some(raw) = raw_items(data.get("certifications")) {
        sections.push((
            SectionKey::Certifications,
            map_each(raw, ids, certification_item),
        ));
    }
    if let Some(raw) = raw_items(data.get("languages")) {
        sections.push((SectionKey::Languages, map_each(raw, ids, language_item)));
    }

    let profiles = match raw_items(data.get("profiles")) {
        Some(raw) if !raw.is_empty() => Some(map_each(raw, ids, profile_item)),
        _ => personal
            .map(|p| derived_profiles(p, ids))
            .filter(|items| !items.is_empty()),
    };
    if let Some(profiles) = profiles {
        sections.push((SectionKey::Profiles, profiles));
    }

    if let Some(skills) = data.get("skills").filter(|v| !v.is_null()) {
        sections.push((SectionKey::Skills, skill_items(skills, ids)));
    }

    sections
}

fn map_each<'a, T: Serialize>(
    raw: Vec<RawItem<'a>>,
    ids: &mut ItemIds,
    map: impl Fn(usize, RawItem<'a>, &mut ItemIds) -> T,
) -> Vec<Value> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| item_value(&map(index + 1, item, ids)))
        .collect()
}

fn set_items(document: &mut Value, key: SectionKey, items: Vec<Value>) {
    if let Some(section) = document
        .pointer_mut(&format!("/sections/{key}"))
        .and_then(Value::as_object_mut)
    {
        section.insert("items".to_string(), Value::Array(items));
    }
}

/// Item sections are shown only when populated, and only if shown by default.
fn apply_visibility(document: &mut Value) {
    for key in SectionKey::item_sections() {
        let Some(section) = document
            .pointer_mut(&format!("/sections/{key}"))
            .and_then(Value::as_object_mut)
        else {
            continue;
        };
        let populated = section
            .get("items")
            .and_then(Value::as_array)
            .is_some_and(|items| !items.is_empty());
        section.insert(
            "visible".to_string(),
            Value::Bool(populated && key.default_visible()),
        );
    }
}

fn claim_id(record: RawRecord<'_>, ids: &mut ItemIds) -> String {
    ids.claim(record.text(&["id"]).as_deref())
}

/// Items are shown unless the record explicitly hides them.
fn item_visible(record: RawRecord<'_>) -> bool {
    record.get("visible").and_then(Value::as_bool).unwrap_or(true)
}

/// Start/end pair when either is present, otherwise a single date field.
fn item_date(record: RawRecord<'_>, single: &[&str]) -> String {
    let start = record.value(START_DATE);
    let end = record.value(END_DATE);
    if start.is_none() && end.is_none() {
        return record.scalar_text(single).unwrap_or_default();
    }
    format_date_value_range(start, end)
}

// ────────────────────────────────────────────────────────────────────────────
// Per-section mappers
// ────────────────────────────────────────────────────────────────────────────

fn education_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> EducationItem {
    let fallback = format!("Education {index}");
    match raw {
        RawItem::Record(r) => EducationItem {
            id: claim_id(r, ids),
            visible: item_visible(r),
            institution: r
                .text(&["institution", "school", "university", "college", "name"])
                .unwrap_or(fallback),
            study_type: r
                .text(&["degree", "studyType", "study_type", "qualification"])
                .unwrap_or_default(),
            area: r
                .text(&["field", "area", "major", "fieldOfStudy", "field_of_study"])
                .unwrap_or_default(),
            score: r.scalar_text(&["gpa", "score", "grade"]).unwrap_or_default(),
            date: item_date(r, ITEM_DATE),
            summary: rich_text(r, &["summary", "description", "details", "highlights"]),
            url: Link::to(r.link(ITEM_URL)),
        },
        RawItem::Text(text) => EducationItem {
            id: ids.fresh(),
            visible: true,
            institution: text.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => EducationItem {
            id: ids.fresh(),
            visible: true,
            institution: fallback,
            ..Default::default()
        },
    }
}

fn experience_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> ExperienceItem {
    let fallback = format!("Company {index}");
    match raw {
        RawItem::Record(r) => {
            let company = r
                .text(&["company", "employer", "organization", "companyName", "company_name"])
                .unwrap_or(fallback);
            let position = r
                .text(&["position", "title", "role", "jobTitle", "job_title"])
                .unwrap_or_default();
            let summary = experience_summary(r, &company, &position);
            ExperienceItem {
                id: claim_id(r, ids),
                visible: item_visible(r),
                location: r.text(&["location", "city"]).unwrap_or_default(),
                date: item_date(r, ITEM_DATE),
                url: Link::to(r.link(&["website", "url", "link", "companyUrl"])),
                company,
                position,
                summary,
            }
        }
        RawItem::Text(text) => ExperienceItem {
            id: ids.fresh(),
            visible: true,
            summary: fallback_summary(text, ""),
            company: text.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => ExperienceItem {
            id: ids.fresh(),
            visible: true,
            summary: fallback_summary(&fallback, ""),
            company: fallback,
            ..Default::default()
        },
    }
}

/// Up to three achievement bullets, else responsibility bullets, else an
/// existing summary, else one sentence built from position and company.
fn experience_summary(record: RawRecord<'_>, company: &str, position: &str) -> String {
    let mut bullets = record.list(&["achievements", "highlights", "accomplishments"]);
    if bullets.is_empty() {
        bullets = record.list(&["responsibilities", "duties", "description", "bullets"]);
    }
    if !bullets.is_empty() {
        bullets.truncate(MAX_EXPERIENCE_BULLETS);
        return bullet_list(&bullets);
    }
    if let Some(existing) = record.text(&["summary"]) {
        return if is_safe_html(&existing) {
            existing
        } else {
            paragraph(&existing)
        };
    }
    fallback_summary(company, position)
}

fn fallback_summary(company: &str, position: &str) -> String {
    if position.is_empty() {
        paragraph(&format!("Worked at {company}."))
    } else {
        paragraph(&format!("{position} at {company}."))
    }
}

fn project_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> ProjectItem {
    let fallback = format!("Project {index}");
    match raw {
        RawItem::Record(r) => {
            let mut keywords = r.keywords(&[
                "technologies",
                "techStack",
                "tech_stack",
                "keywords",
                "skills",
                "tools",
            ]);
            keywords.truncate(MAX_PROJECT_KEYWORDS);
            ProjectItem {
                id: claim_id(r, ids),
                visible: item_visible(r),
                name: r
                    .text(&["name", "title", "projectName", "project_name"])
                    .unwrap_or(fallback),
                description: r
                    .text(&["role", "description", "subtitle", "type"])
                    .unwrap_or_default(),
                date: item_date(r, ITEM_DATE),
                summary: rich_text(r, &["summary", "details", "highlights"]),
                keywords,
                url: Link::to(r.link(&[
                    "website",
                    "url",
                    "link",
                    "github",
                    "repository",
                    "repo",
                ])),
            }
        }
        RawItem::Text(text) => ProjectItem {
            id: ids.fresh(),
            visible: true,
            name: text.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => ProjectItem {
            id: ids.fresh(),
            visible: true,
            name: fallback,
            ..Default::default()
        },
    }
}

fn profile_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> ProfileItem {
    match raw {
        RawItem::Record(r) => {
            let href = r.link(&["url", "link", "href"]);
            let network = r
                .text(&["network", "platform", "site", "name"])
                .or_else(|| href.as_deref().and_then(network_from_url).map(String::from))
                .unwrap_or_else(|| format!("Profile {index}"));
            let username = r
                .text(&["username", "handle", "user"])
                .or_else(|| href.as_deref().and_then(username_from_url))
                .unwrap_or_default();
            ProfileItem {
                id: claim_id(r, ids),
                visible: item_visible(r),
                icon: resolve_profile_icon(&network).to_string(),
                network,
                username,
                url: Link::to(href),
            }
        }
        RawItem::Text(text) if looks_like_url(text) => {
            let network = network_from_url(text)
                .map(String::from)
                .unwrap_or_else(|| format!("Profile {index}"));
            ProfileItem {
                id: ids.fresh(),
                visible: true,
                icon: resolve_profile_icon(&network).to_string(),
                network,
                username: username_from_url(text).unwrap_or_default(),
                url: Link::to(Some(text.to_string())),
            }
        }
        RawItem::Text(network) => ProfileItem {
            id: ids.fresh(),
            visible: true,
            icon: resolve_profile_icon(network).to_string(),
            network: network.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => ProfileItem {
            id: ids.fresh(),
            visible: true,
            network: format!("Profile {index}"),
            icon: resolve_profile_icon("").to_string(),
            ..Default::default()
        },
    }
}

/// Profiles built from `personal.linkedin`, `personal.github` and friends.
fn derived_profiles(personal: RawRecord<'_>, ids: &mut ItemIds) -> Vec<Value> {
    PERSONAL_PROFILES
        .iter()
        .filter_map(|(field, network)| {
            let href = personal.text(&[*field])?;
            Some(item_value(&ProfileItem {
                id: ids.fresh(),
                visible: true,
                network: network.to_string(),
                username: username_from_url(&href).unwrap_or_default(),
                icon: resolve_profile_icon(network).to_string(),
                url: Link::to(Some(href)),
            }))
        })
        .collect()
}

fn certification_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> CertificationItem {
    let fallback = format!("Certification {index}");
    match raw {
        RawItem::Record(r) => CertificationItem {
            id: claim_id(r, ids),
            visible: item_visible(r),
            name: r
                .text(&["name", "title", "certification"])
                .unwrap_or(fallback),
            issuer: r
                .text(&["issuer", "authority", "organization", "issuedBy"])
                .unwrap_or_default(),
            date: item_date(r, ISSUE_DATE),
            summary: rich_text(r, &["summary", "description"]),
            url: Link::to(r.link(ITEM_URL)),
        },
        RawItem::Text(text) => CertificationItem {
            id: ids.fresh(),
            visible: true,
            name: text.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => CertificationItem {
            id: ids.fresh(),
            visible: true,
            name: fallback,
            ..Default::default()
        },
    }
}

fn language_item(index: usize, raw: RawItem<'_>, ids: &mut ItemIds) -> LanguageItem {
    let fallback = format!("Language {index}");
    match raw {
        RawItem::Record(r) => {
            let description = r
                .text(&["proficiency", "fluency", "description", "level"])
                .unwrap_or_default();
            LanguageItem {
                id: claim_id(r, ids),
                visible: item_visible(r),
                name: r.text(&["language", "name"]).unwrap_or(fallback),
                level: language_level(r, &description),
                description,
            }
        }
        RawItem::Text(text) => LanguageItem {
            id: ids.fresh(),
            visible: true,
            name: text.to_string(),
            ..Default::default()
        },
        RawItem::Opaque => LanguageItem {
            id: ids.fresh(),
            visible: true,
            name: fallback,
            ..Default::default()
        },
    }
}

/// Numeric `level` clamped to 0..=5, else a level read off the proficiency words.
fn language_level(record: RawRecord<'_>, description: &str) -> u8 {
    if let Some(level) = record.get("level").and_then(Value::as_u64) {
        return level.min(5) as u8;
    }
    let description = description.to_lowercase();
    PROFICIENCY_LEVELS
        .iter()
        .find(|(word, _)| description.contains(word))
        .map(|(_, level)| *level)
        .unwrap_or(0)
}

/// Entries that already look like normalized skill items keep their id and
/// shape; everything else is bucketed into categories.
fn skill_items(raw: &Value, ids: &mut ItemIds) -> Vec<Value> {
    let (kept, rest): (Vec<&Value>, Vec<&Value>) = match raw {
        Value::Array(entries) => entries.iter().partition(|entry| is_skill_item(entry)),
        other => (Vec::new(), vec![other]),
    };

    let mut items: Vec<Value> = kept
        .into_iter()
        .filter_map(|entry| entry.as_object().map(RawRecord))
        .map(|r| {
            item_value(&SkillItem {
                id: claim_id(r, ids),
                visible: item_visible(r),
                name: r.text(&["name"]).unwrap_or_default(),
                description: r.text(&["description"]).unwrap_or_default(),
                level: r
                    .get("level")
                    .and_then(Value::as_u64)
                    .map_or(0, |level| level.min(5) as u8),
                keywords: r.keywords(&["keywords"]),
            })
        })
        .collect();

    let rest = Value::Array(rest.into_iter().cloned().collect());
    items.extend(group_skills(&rest).into_iter().map(|group| {
        item_value(&SkillItem {
            id: ids.fresh(),
            visible: true,
            name: group.name,
            description: String::new(),
            level: 0,
            keywords: group.keywords,
        })
    }));
    items
}

fn is_skill_item(entry: &Value) -> bool {
    let Some(fields) = entry.as_object() else {
        return false;
    };
    fields.get("id").and_then(Value::as_str).is_some_and(is_item_id)
        && fields.get("name").is_some_and(Value::is_string)
        && fields.get("keywords").is_some_and(Value::is_array)
}

// ────────────────────────────────────────────────────────────────────────────
// Metadata
// ────────────────────────────────────────────────────────────────────────────

fn apply_metadata(
    document: &mut Value,
    parsed: &ParsedResponse,
    options: &BuildOptions,
    now: DateTime<Utc>,
) {
    let Some(metadata) = document.get_mut("metadata").and_then(Value::as_object_mut) else {
        return;
    };
    let confidence = parsed
        .confidence
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0);

    metadata.insert("aiGenerated".to_string(), Value::Bool(true));
    metadata.insert(
        "aiGeneratedAt".to_string(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    metadata.insert(
        "needsReview".to_string(),
        Value::Bool(parsed.needs_review != Some(false)),
    );
    metadata.insert("confidence".to_string(), json!(confidence));

    if let Some(template) = options
        .template
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        metadata.insert("template".to_string(), Value::String(template.to_string()));
    }

    if !parsed.analysis.suggestions.is_empty() {
        let notes = parsed
            .analysis
            .suggestions
            .iter()
            .map(|s| paragraph(s))
            .collect::<String>();
        metadata.insert("notes".to_string(), Value::String(notes));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML helpers
// ────────────────────────────────────────────────────────────────────────────

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn is_safe_html(text: &str) -> bool {
    RE_SAFE_HTML.is_match(text.trim())
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>", escape_html(text.trim()))
}

fn bullet_list(lines: &[String]) -> String {
    let items = lines
        .iter()
        .map(|line| format!("<li>{}</li>", escape_html(line)))
        .collect::<String>();
    format!("<ul>{items}</ul>")
}

/// Paragraph or list markup is kept; other text is escaped, one line to a
/// paragraph and several to a list.
fn rich_text(record: RawRecord<'_>, aliases: &[&str]) -> String {
    if let Some(text) = record.text(aliases) {
        if is_safe_html(&text) {
            return text;
        }
    }
    match record.list(aliases).as_slice() {
        [] => String::new(),
        [single] => paragraph(single),
        many => bullet_list(many),
    }
}

fn looks_like_url(text: &str) -> bool {
    text.contains("://") || text.starts_with("www.") || network_from_url(text).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    fn parsed(extracted: Value) -> ParsedResponse {
        ParsedResponse {
            extracted_data: extracted,
            ..Default::default()
        }
    }

    fn normalize(extracted: Value) -> Value {
        normalize_response(&parsed(extracted), &BuildOptions::default())
    }

    fn items<'a>(document: &'a Value, key: &str) -> &'a Vec<Value> {
        document["sections"][key]["items"].as_array().unwrap()
    }

    #[test]
    fn test_education_mapped_and_empty_experience_hidden() {
        let document = normalize(json!({
            "education": [{"institution": "MIT", "degree": "BSc"}],
            "experience": []
        }));

        let education = items(&document, "education");
        assert_eq!(education.len(), 1);
        assert_eq!(education[0]["institution"], json!("MIT"));
        assert_eq!(education[0]["studyType"], json!("BSc"));
        assert_eq!(education[0]["date"], json!(""));
        assert!(is_item_id(education[0]["id"].as_str().unwrap()));
        assert_eq!(document["sections"]["education"]["visible"], json!(true));

        assert!(items(&document, "experience").is_empty());
        assert_eq!(document["sections"]["experience"]["visible"], json!(false));
    }

    #[test]
    fn test_empty_extraction_yields_full_template() {
        let document = normalize(json!({}));
        assert_eq!(document["metadata"]["confidence"], json!(DEFAULT_CONFIDENCE));
        assert_eq!(document["metadata"]["aiGenerated"], json!(true));
        assert_eq!(document["metadata"]["needsReview"], json!(true));
        let sections = document["sections"].as_object().unwrap();
        for key in SectionKey::ALL {
            assert!(sections.contains_key(key.as_str()), "missing {key}");
        }
        for key in SectionKey::item_sections() {
            assert_eq!(document["sections"][key.as_str()]["visible"], json!(false));
        }
    }

    #[test]
    fn test_null_extraction_is_handled() {
        let document = normalize(Value::Null);
        assert_eq!(document["basics"]["name"], json!(""));
        assert!(items(&document, "skills").is_empty());
    }

    #[test]
    fn test_personal_fields_and_summary() {
        let document = normalize(json!({
            "personal": {
                "name": "Ada Lovelace",
                "title": "Engineer",
                "email": "ada@example.com",
                "phone": "+44 1",
                "location": "London",
                "website": "https://ada.dev",
                "summary": "Builds <engines> & more"
            }
        }));
        let basics = &document["basics"];
        assert_eq!(basics["name"], json!("Ada Lovelace"));
        assert_eq!(basics["headline"], json!("Engineer"));
        assert_eq!(basics["email"], json!("ada@example.com"));
        assert_eq!(basics["url"]["href"], json!("https://ada.dev"));
        assert_eq!(
            document["sections"]["summary"]["content"],
            json!("<p>Builds &lt;engines&gt; &amp; more</p>")
        );
    }

    #[test]
    fn test_empty_summary_is_not_wrapped() {
        let document = normalize(json!({"personal": {"name": "A", "summary": "  "}}));
        assert_eq!(document["sections"]["summary"]["content"], json!(""));
    }

    #[test]
    fn test_experience_bullets_and_dates() {
        let document = normalize(json!({
            "experience": [
                {
                    "company": "Acme",
                    "position": "Engineer",
                    "startDate": "2020",
                    "endDate": "present",
                    "achievements": ["One", "Two", "Three", "Four"]
                },
                {
                    "company": "Initech",
                    "responsibilities": "Kept TPS reports\nFixed printers"
                },
                {"position": "Intern"}
            ]
        }));
        let experience = items(&document, "experience");
        assert_eq!(experience[0]["date"], json!("2020 to Present"));
        assert_eq!(
            experience[0]["summary"],
            json!("<ul><li>One</li><li>Two</li><li>Three</li></ul>")
        );
        assert_eq!(
            experience[1]["summary"],
            json!("<ul><li>Kept TPS reports</li><li>Fixed printers</li></ul>")
        );
        assert_eq!(experience[2]["company"], json!("Company 3"));
        assert_eq!(experience[2]["summary"], json!("<p>Intern at Company 3.</p>"));
    }

    #[test]
    fn test_fallback_labels_for_odd_items() {
        let document = normalize(json!({
            "education": ["Stanford", 42],
            "projects": [null, {"description": "Maintainer", "summary": "A thing"}],
            "certifications": [true]
        }));
        let education = items(&document, "education");
        assert_eq!(education[0]["institution"], json!("Stanford"));
        assert_eq!(education[1]["institution"], json!("Education 2"));
        let projects = items(&document, "projects");
        assert_eq!(projects[0]["name"], json!("Project 1"));
        assert_eq!(projects[1]["name"], json!("Project 2"));
        assert_eq!(projects[1]["description"], json!("Maintainer"));
        assert_eq!(projects[1]["summary"], json!("<p>A thing</p>"));
        assert_eq!(items(&document, "certifications")[0]["name"], json!("Certification 1"));
    }

    #[test]
    fn test_projects_keywords_and_url() {
        let document = normalize(json!({
            "projects": [{
                "name": "Ledger",
                "technologies": "Rust, Axum, Postgres",
                "url": "https://example.com"
            }]
        }));
        let project = &items(&document, "projects")[0];
        assert_eq!(project["keywords"], json!(["Rust", "Axum", "Postgres"]));
        assert_eq!(project["url"], json!({"label": "", "href": "https://example.com"}));
    }

    #[test]
    fn test_skills_grouped_into_items() {
        let document = normalize(json!({"skills": ["React", "Leadership", "Rust"]}));
        let skills = items(&document, "skills");
        assert!(!skills.is_empty());
        for skill in skills {
            assert_eq!(skill["level"], json!(0));
            assert_eq!(skill["description"], json!(""));
            assert!(!skill["keywords"].as_array().unwrap().is_empty());
        }
        assert_eq!(document["sections"]["skills"]["visible"], json!(true));
    }

    #[test]
    fn test_profiles_from_array_and_from_personal() {
        let document = normalize(json!({
            "profiles": [{"url": "https://github.com/ada"}, "https://www.linkedin.com/in/ada/"]
        }));
        let profiles = items(&document, "profiles");
        assert_eq!(profiles[0]["network"], json!("GitHub"));
        assert_eq!(profiles[0]["icon"], json!("github"));
        assert_eq!(profiles[0]["username"], json!("ada"));
        assert_eq!(profiles[1]["network"], json!("LinkedIn"));

        let derived = normalize(json!({
            "personal": {"name": "Ada", "github": "https://github.com/ada"}
        }));
        let profiles = items(&derived, "profiles");
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0]["network"], json!("GitHub"));
        assert_eq!(profiles[0]["url"]["href"], json!("https://github.com/ada"));
    }

    #[test]
    fn test_languages_levels() {
        let document = normalize(json!({
            "languages": [
                {"language": "English", "proficiency": "Native"},
                {"name": "Spanish", "level": 9},
                "French"
            ]
        }));
        let languages = items(&document, "languages");
        assert_eq!(languages[0]["level"], json!(5));
        assert_eq!(languages[0]["description"], json!("Native"));
        assert_eq!(languages[1]["level"], json!(5));
        assert_eq!(languages[2]["name"], json!("French"));
        // Languages are hidden by default even when populated.
        assert_eq!(document["sections"]["languages"]["visible"], json!(false));
    }

    #[test]
    fn test_ids_unique_and_valid_ids_preserved() {
        let keep = "cabcdefghijklmnopqrstuvwxy";
        let document = normalize(json!({
            "education": [{"id": keep, "institution": "A"}, {"id": keep, "institution": "B"}],
            "experience": [{"company": "C"}, {"id": "bad", "company": "D"}],
            "skills": ["Rust", "Teamwork"]
        }));
        let mut seen = HashSet::new();
        for key in ["education", "experience", "skills"] {
            for item in items(&document, key) {
                let id = item["id"].as_str().unwrap();
                assert!(is_item_id(id));
                assert!(seen.insert(id.to_string()), "duplicate id {id}");
            }
        }
        assert_eq!(items(&document, "education")[0]["id"], json!(keep));
    }

    #[test]
    fn test_metadata_stamps() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let response = ParsedResponse {
            extracted_data: json!({"personal": {"name": "Ada"}}),
            confidence: Some(1.7),
            needs_review: Some(false),
            ..Default::default()
        };
        let options = BuildOptions {
            template: Some("azurill".into()),
            ..Default::default()
        };
        let document = normalize_at(&response, &options, now);
        let metadata = &document["metadata"];
        assert_eq!(metadata["aiGeneratedAt"], json!("2024-05-01T12:30:00.000Z"));
        assert_eq!(metadata["confidence"], json!(1.0));
        assert_eq!(metadata["needsReview"], json!(false));
        assert_eq!(metadata["template"], json!("azurill"));
    }

    #[test]
    fn test_resume_data_used_when_extraction_empty() {
        let response = ParsedResponse {
            extracted_data: json!({}),
            resume_data: Some(json!({
                "basics": {"name": "From Resume Data"},
                "sections": {"skills": ["Rust"]}
            })),
            ..Default::default()
        };
        let document = normalize_response(&response, &BuildOptions::default());
        assert_eq!(document["basics"]["name"], json!("From Resume Data"));
        assert_eq!(items(&document, "skills").len(), 1);
        assert_eq!(document["metadata"]["aiGenerated"], json!(true));
    }

    #[test]
    fn test_fallback_response_notes() {
        let response = ParsedResponse::fallback(0.5, "Could not parse.");
        let document = normalize_response(&response, &BuildOptions::default());
        assert_eq!(document["metadata"]["confidence"], json!(0.5));
        assert_eq!(document["metadata"]["needsReview"], json!(true));
        assert_eq!(document["metadata"]["notes"], json!("<p>Could not parse.</p>"));
    }

    #[test]
    fn test_output_is_repair_fixed_point() {
        let document = normalize(json!({
            "personal": {"name": "Ada", "linkedin": "https://linkedin.com/in/ada"},
            "education": [{"school": "MIT"}],
            "experience": [{"company": "Acme", "description": "Did things"}],
            "skills": {"Backend": ["Rust", "Go"]},
            "projects": ["Side project"]
        }));
        assert_eq!(repair_document(&document), document);
    }

    #[test]
    fn test_model_markup_outside_whitelist_is_escaped() {
        let document = normalize(json!({
            "personal": {"summary": "<img src=x onerror=alert(1)>"},
            "experience": [{"company": "Acme", "summary": "<script>alert(1)</script>"}],
            "education": [{"institution": "MIT", "summary": "<p onclick=\"x()\">Thesis</p>"}],
            "certifications": [{"name": "CKA", "summary": "<p>Kubernetes</p><ul><li>Admin</li></ul>"}]
        }));
        assert_eq!(
            document["sections"]["summary"]["content"],
            json!("<p>&lt;img src=x onerror=alert(1)&gt;</p>")
        );
        assert_eq!(
            items(&document, "experience")[0]["summary"],
            json!("<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>")
        );
        assert_eq!(
            items(&document, "education")[0]["summary"],
            json!("<p>&lt;p onclick=&quot;x()&quot;&gt;Thesis&lt;/p&gt;</p>")
        );
        assert_eq!(
            items(&document, "certifications")[0]["summary"],
            json!("<p>Kubernetes</p><ul><li>Admin</li></ul>")
        );
    }

    #[test]
    fn test_links_given_as_objects_are_read() {
        let document = normalize(json!({
            "personal": {"website": {"label": "", "href": "https://ada.dev"}},
            "education": [{"institution": "MIT", "website": "https://mit.edu", "url": "https://other.edu"}],
            "profiles": [{"network": "GitHub", "url": {"label": "", "href": "https://github.com/ada"}}]
        }));
        assert_eq!(document["basics"]["url"]["href"], json!("https://ada.dev"));
        assert_eq!(items(&document, "education")[0]["url"]["href"], json!("https://mit.edu"));
        let profile = &items(&document, "profiles")[0];
        assert_eq!(profile["url"]["href"], json!("https://github.com/ada"));
        assert_eq!(profile["username"], json!("ada"));
    }

    #[test]
    fn test_normalized_sections_survive_a_second_pass() {
        let first = normalize(json!({
            "education": [{
                "institution": "MIT",
                "degree": "BSc",
                "field": "CS",
                "gpa": 3.8,
                "startDate": "2014",
                "endDate": "2018",
                "description": "Thesis on engines",
                "url": "https://mit.edu"
            }],
            "experience": [{
                "company": "Acme",
                "position": "Engineer",
                "startDate": "2020",
                "endDate": "present",
                "achievements": ["Cut costs & time", "Shipped v2"],
                "website": "https://acme.com"
            }],
            "projects": [{
                "name": "Ledger",
                "role": "Lead",
                "summary": "Double-entry engine",
                "technologies": ["Rust", "Postgres"],
                "url": "https://example.com",
                "visible": false
            }],
            "certifications": [{"name": "CKA", "issuer": "CNCF", "date": "2021", "url": "https://cncf.io"}],
            "languages": [
                {"language": "English", "proficiency": "Native"},
                {"name": "Spanish", "level": 3}
            ],
            "profiles": [{"url": "https://github.com:443/ada"}],
            "skills": ["React", "Rust", "Leadership"]
        }));

        let sections = [
            "education",
            "experience",
            "projects",
            "certifications",
            "languages",
            "profiles",
            "skills",
        ];
        let mut extracted = Map::new();
        for key in sections {
            extracted.insert(key.to_string(), Value::Array(items(&first, key).clone()));
        }
        let second = normalize(Value::Object(extracted));

        for key in sections {
            assert_eq!(items(&second, key), items(&first, key), "section {key} changed");
        }
        let project = &items(&second, "projects")[0];
        assert_eq!(project["description"], json!("Lead"));
        assert_eq!(project["summary"], json!("<p>Double-entry engine</p>"));
        assert_eq!(project["visible"], json!(false));
        assert_eq!(items(&second, "profiles")[0]["network"], json!("GitHub"));
    }
}
