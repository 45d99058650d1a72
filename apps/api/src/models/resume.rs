//! The structured resume shape returned to callers and fed to the renderers.
//!
//! Model output is never trusted to match the schema. Records are built from a
//! loosely-typed `serde_json::Value` one field at a time: a field with the wrong
//! shape is dropped, never fatal.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Canonical resume record. Every field is optional.
///
/// Keys outside the schema are kept in `extra` and serialized back unchanged,
/// so clients see everything the model produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub professional_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<Vec<Education>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<Vec<Experience>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<Project>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifications: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achievements: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub technologies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
}

/// Top-level keys mapped onto typed fields; everything else lands in `extra`.
const RECORD_KEYS: &[&str] = &[
    "name",
    "email",
    "phone",
    "linkedin",
    "location",
    "professional_summary",
    "education",
    "skills",
    "experience",
    "projects",
    "achievements",
    "certifications",
];

impl ResumeRecord {
    /// Best-effort mapping from a JSON object. Returns `None` for non-objects.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;

        let extra = obj
            .iter()
            .filter(|(k, _)| !RECORD_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(ResumeRecord {
            name: text(obj.get("name")),
            email: text(obj.get("email")),
            phone: text(obj.get("phone")),
            linkedin: text(obj.get("linkedin")),
            location: text(obj.get("location")),
            professional_summary: text(obj.get("professional_summary")),
            education: objects(obj.get("education"), |e| Education {
                institution: text(e.get("institution")),
                degree: text(e.get("degree")),
                field: text(e.get("field")),
                start_date: text(e.get("startDate")),
                end_date: text(e.get("endDate")),
                score: text(e.get("score")),
            }),
            skills: text_list(obj.get("skills")),
            experience: objects(obj.get("experience"), |e| Experience {
                company: text(e.get("company")),
                role: text(e.get("role")),
                start_date: text(e.get("startDate")),
                end_date: text(e.get("endDate")),
                achievements: text_list(e.get("achievements")),
            }),
            projects: objects(obj.get("projects"), |p| Project {
                name: text(p.get("name")),
                description: text(p.get("description")),
                technologies: text_list(p.get("technologies")),
                impact: text(p.get("impact")),
            }),
            achievements: text_list(obj.get("achievements")),
            certifications: text_list(obj.get("certifications")),
            extra,
        })
    }

    /// Name used for download file names and document titles.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Resume")
    }
}

/// Strings pass through; numbers and booleans are rendered as text.
fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_list(value: Option<&Value>) -> Option<Vec<String>> {
    let items = value?.as_array()?;
    Some(items.iter().filter_map(|v| text(Some(v))).collect())
}

fn objects<T>(value: Option<&Value>, map: impl Fn(&Map<String, Value>) -> T) -> Option<Vec<T>> {
    let items = value?.as_array()?;
    Some(items.iter().filter_map(Value::as_object).map(map).collect())
}
