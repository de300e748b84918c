//! Typed section items produced by the normalizer.
//!
//! Field names serialize to the camelCase keys the renderer expects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

impl Link {
    pub fn to(href: Option<String>) -> Self {
        Self {
            label: String::new(),
            href: href.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationItem {
    pub id: String,
    pub visible: bool,
    pub institution: String,
    pub study_type: String,
    pub area: String,
    pub score: String,
    pub date: String,
    pub summary: String,
    pub url: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceItem {
    pub id: String,
    pub visible: bool,
    pub company: String,
    pub position: String,
    pub location: String,
    pub date: String,
    pub summary: String,
    pub url: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectItem {
    pub id: String,
    pub visible: bool,
    pub name: String,
    pub description: String,
    pub date: String,
    pub summary: String,
    pub keywords: Vec<String>,
    pub url: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileItem {
    pub id: String,
    pub visible: bool,
    pub network: String,
    pub username: String,
    pub icon: String,
    pub url: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillItem {
    pub id: String,
    pub visible: bool,
    pub name: String,
    pub description: String,
    pub level: u8,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationItem {
    pub id: String,
    pub visible: bool,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub summary: String,
    pub url: Link,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageItem {
    pub id: String,
    pub visible: bool,
    pub name: String,
    pub description: String,
    pub level: u8,
}

/// Serializes any item into the JSON stored under `sections.<key>.items`.
pub fn item_value<T: Serialize>(item: &T) -> Value {
    // Plain structs of strings, bools and small integers always serialize.
    serde_json::to_value(item).unwrap_or(Value::Null)
}
