//! Buckets a flat, loosely-shaped skill list into labeled categories.

use std::collections::HashSet;

use serde_json::Value;

pub const MAX_KEYWORDS_PER_GROUP: usize = 10;
pub const OTHER_CATEGORY: &str = "Other Skills";

struct Category {
    name: &'static str,
    /// Whole-skill matches, for tokens too short to substring-match safely.
    exact: &'static [&'static str],
    contains: &'static [&'static str],
}

// Order matters: the first matching category wins ("javascript" is web, not java).
const CATEGORIES: &[Category] = &[
    Category {
        name: "Web Technologies",
        exact: &["rest", "vue"],
        contains: &[
            "html", "css", "javascript", "typescript", "react", "angular", "vue.js", "node",
            "next.js", "svelte", "tailwind", "sass", "jquery", "graphql", "webpack", "web ",
            "frontend", "front-end", "rest api",
        ],
    },
    Category {
        name: "Tools & Frameworks",
        exact: &["git", "aws", "gcp", "jira"],
        contains: &[
            "docker", "kubernetes", "github", "gitlab", "azure", "terraform", "jenkins",
            "django", "flask", "spring", "rails", "laravel", ".net", "tensorflow", "pytorch",
            "figma", "ansible", "ci/cd", "framework", "excel", "tableau", "postgres", "mysql",
            "mongodb", "redis", "kafka",
        ],
    },
    Category {
        name: "Technical Skills",
        exact: &["go", "c", "r", "sql"],
        contains: &[
            "python", "java", "c++", "c#", "rust", "golang", "ruby", "php", "kotlin", "swift",
            "scala", "programming", "algorithm", "data structure", "machine learning",
            "data analysis", "database", "networking", "security", "linux", "cloud",
            "devops", "testing", "statistics",
        ],
    },
    Category {
        name: "Soft Skills",
        exact: &[],
        contains: &[
            "communication", "leadership", "teamwork", "team work", "management",
            "problem solving", "problem-solving", "collaboration", "presentation",
            "negotiation", "mentoring", "time management", "critical thinking",
            "adaptability", "creativity", "public speaking",
        ],
    },
    Category {
        name: "Languages",
        exact: &[],
        contains: &[
            "english", "spanish", "french", "german", "chinese", "mandarin", "japanese",
            "portuguese", "italian", "arabic", "hindi", "russian", "korean", "dutch",
        ],
    },
];

/// One labeled bucket of skills.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillGroup {
    pub name: String,
    pub keywords: Vec<String>,
}

/// Groups raw skill entries (strings, `{name, level, keywords}` objects, or a
/// category → list map) into categories. Empty categories are dropped and each
/// group keeps at most ten keywords.
pub fn group_skills(raw: &Value) -> Vec<SkillGroup> {
    let mut seen = HashSet::new();
    let mut buckets: Vec<(&'static str, Vec<String>)> = CATEGORIES
        .iter()
        .map(|c| (c.name, Vec::new()))
        .chain(std::iter::once((OTHER_CATEGORY, Vec::new())))
        .collect();

    for skill in flatten_skills(raw) {
        if !seen.insert(skill.to_lowercase()) {
            continue;
        }
        let slot = categorize(&skill).unwrap_or(CATEGORIES.len());
        buckets[slot].1.push(skill);
    }

    buckets
        .into_iter()
        .filter(|(_, keywords)| !keywords.is_empty())
        .map(|(name, mut keywords)| {
            keywords.truncate(MAX_KEYWORDS_PER_GROUP);
            SkillGroup {
                name: name.to_string(),
                keywords,
            }
        })
        .collect()
}

fn categorize(skill: &str) -> Option<usize> {
    let lower = skill.to_lowercase();
    CATEGORIES.iter().position(|category| {
        category.exact.contains(&lower.as_str())
            || category.contains.iter().any(|needle| lower.contains(needle))
    })
}

/// Flattens whatever skill shape arrives into trimmed, non-empty names.
pub fn flatten_skills(raw: &Value) -> Vec<String> {
    let mut skills = Vec::new();
    collect_skills(raw, &mut skills);
    skills
}

fn collect_skills(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => out.extend(split_skill_list(text)),
        Value::Array(entries) => entries.iter().for_each(|entry| collect_skills(entry, out)),
        Value::Object(fields) => {
            let is_entry = ["name", "skill", "title", "keywords", "skills", "items"]
                .iter()
                .any(|key| fields.contains_key(*key));
            if is_entry {
                for key in ["name", "skill", "title"] {
                    if let Some(Value::String(name)) = fields.get(key) {
                        out.extend(split_skill_list(name));
                        break;
                    }
                }
                for key in ["keywords", "skills", "items"] {
                    if let Some(list) = fields.get(key) {
                        collect_skills(list, out);
                    }
                }
            } else {
                // A category map: {"Backend": ["Rust", "Go"], ...}
                fields.values().for_each(|entry| collect_skills(entry, out));
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

fn split_skill_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n', '•'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
