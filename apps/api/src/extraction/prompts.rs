// Prompt constants for the Extraction module.
// The skeleton below is the contract the normalizer reads; keep them in step.

use super::format::TextFormat;
use super::BuildOptions;
use crate::sources::SourceType;

/// Longest excerpt of resume text sent to the model, in characters.
pub const MAX_EXCERPT_CHARS: usize = 5000;

const TRUNCATION_MARKER: &str = "\n[... resume text truncated ...]";

/// System prompt for resume extraction. Enforces JSON-only output.
pub const EXTRACTION_SYSTEM: &str = "You are an expert resume parser. \
    You read resumes in any layout and extract their content into structured data. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Extraction prompt template.
/// Replace `{format_hint}`, `{source_hint}`, `{language_hint}` and `{resume_text}` before sending.
pub const EXTRACTION_PROMPT_TEMPLATE: &str = r#"Extract the content of the resume below into structured data.

{format_hint}
{source_hint}{language_hint}

Return a JSON object with this EXACT schema (no extra fields):
{
  "extractedData": {
    "personal": {
      "name": "Full name",
      "title": "Current or target job title",
      "email": "email@example.com",
      "phone": "+1 555 0100",
      "location": "City, Country",
      "website": "https://example.com",
      "linkedin": "https://linkedin.com/in/handle",
      "github": "https://github.com/handle",
      "summary": "Two or three sentence professional summary"
    },
    "experience": [
      {
        "company": "Company name",
        "position": "Job title",
        "location": "City, Country",
        "startDate": "Jan 2020",
        "endDate": "Present",
        "achievements": ["Measurable outcome", "Another outcome"]
      }
    ],
    "education": [
      {
        "institution": "University name",
        "degree": "Degree type",
        "field": "Field of study",
        "startDate": "2014",
        "endDate": "2018",
        "gpa": "3.8"
      }
    ],
    "skills": ["Skill", "Another skill"],
    "projects": [
      {
        "name": "Project name",
        "role": "Your role on the project",
        "summary": "What it does",
        "technologies": ["Tech", "Another tech"],
        "url": "https://example.com/project"
      }
    ],
    "certifications": [
      {"name": "Certification", "issuer": "Issuing body", "date": "2021"}
    ],
    "languages": [
      {"language": "English", "proficiency": "Native"}
    ]
  },
  "confidence": 0.9,
  "needsReview": false
}

Rules:
- Use only information present in the resume. Do NOT invent employers, dates or degrees.
- Use an empty string or an empty array when a field is not present.
- Keep dates exactly as written in the resume.
- "confidence" is a number between 0 and 1 describing how complete and reliable the extraction is.
- Set "needsReview" to true when the text was garbled, ambiguous or partially unreadable.
- Return the JSON object only: no prose before or after it, and no code fences.

Resume text:
{resume_text}
"#;

fn format_hint(format: TextFormat) -> &'static str {
    match format {
        TextFormat::Markdown => {
            "The resume is written in Markdown: headings start with '#' and list items with '-' or '*'."
        }
        TextFormat::Structured => {
            "The resume is organized under uppercase section headings such as EXPERIENCE, EDUCATION and SKILLS."
        }
        TextFormat::Plain => {
            "The resume is unstructured plain text: infer the sections from context."
        }
    }
}

fn source_hint(source: SourceType) -> &'static str {
    match source {
        SourceType::Text => "The text was pasted directly by the user.",
        SourceType::Pdf => {
            "The text was extracted from a PDF, so line breaks and column order may be scrambled."
        }
        SourceType::Doc => {
            "The text was scraped from a Word document and may contain stray formatting characters."
        }
        SourceType::LinkedIn => {
            "The text was exported from a LinkedIn profile and is already grouped by section."
        }
    }
}

/// Keeps at most `MAX_EXCERPT_CHARS` characters, marking the cut.
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(MAX_EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &text[..cut]),
        None => text.to_string(),
    }
}

/// Builds the user prompt for one extraction. Deterministic for the same inputs.
pub fn build_extraction_prompt(text: &str, options: &BuildOptions, format: TextFormat) -> String {
    let language_hint = match options.language.as_deref().map(str::trim) {
        Some(language) if !language.is_empty() => {
            format!("\nThe resume is written in {language}; keep field values in that language.")
        }
        _ => String::new(),
    };

    EXTRACTION_PROMPT_TEMPLATE
        .replace("{format_hint}", format_hint(format))
        .replace("{source_hint}", source_hint(options.source_type))
        .replace("{language_hint}", &language_hint)
        .replace("{resume_text}", &excerpt(text))
}
