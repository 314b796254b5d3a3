//! Field-name keyed form state and client-side validation of listing drafts.
//!
//! [`FormState`] stands in for an HTML form: every value is the string a user
//! would have typed. [`FormState::populate`] and [`FormState::serialize`] are
//! pure, so the same state can back an edit dialog, a create form or a CLI.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use shared::{
    domain::{EducationLevel, Internship, LocationType},
    protocol::InternshipPayload,
};
use validator::Validate;

use crate::error::ClientError;

pub const INTERNSHIP_FIELDS: [&str; 11] = [
    "internship_title",
    "industry_domain",
    "location_type",
    "education_level",
    "duration",
    "minimum_gpa",
    "stipend",
    "fulltime_conversion",
    "required_skills",
    "description",
    "past_intern_records",
];

const REQUIRED_FIELDS: [&str; 5] = [
    "internship_title",
    "industry_domain",
    "location_type",
    "education_level",
    "duration",
];

pub fn field_display_name(name: &str) -> String {
    match name {
        "internship_title" => "Internship Title".to_string(),
        "industry_domain" => "Industry Domain".to_string(),
        "required_skills" => "Required Skills".to_string(),
        "education_level" => "Education Level".to_string(),
        "minimum_gpa" => "Minimum GPA".to_string(),
        "location_type" => "Location Type".to_string(),
        "duration" => "Duration".to_string(),
        "stipend" => "Stipend".to_string(),
        "fulltime_conversion" => "Full-time Conversion".to_string(),
        "description" => "Description".to_string(),
        "past_intern_records" => "Past Intern Records".to_string(),
        other => other
            .split('_')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    fields: BTreeMap<String, String>,
}

impl FormState {
    pub fn with_fields<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            fields: names
                .into_iter()
                .map(|name| (name.to_string(), String::new()))
                .collect(),
        }
    }

    /// Empty form carrying every listing field.
    pub fn internship() -> Self {
        Self::with_fields(INTERNSHIP_FIELDS)
    }

    pub fn for_item(item: &Internship) -> Self {
        let mut form = Self::internship();
        if let Ok(record) = serde_json::to_value(item) {
            form.populate(&record);
        }
        form
    }

    /// Sets a known field. Unknown names are rejected the way a form ignores
    /// inputs it does not have.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(name) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Copies values from a record into same-named fields. Null and empty
    /// values are skipped so whatever the field held before stays in place.
    /// Returns how many fields were written.
    pub fn populate(&mut self, record: &Value) -> usize {
        let Some(object) = record.as_object() else {
            return 0;
        };

        let mut written = 0;
        for (name, value) in object {
            let Some(slot) = self.fields.get_mut(name) else {
                continue;
            };
            let text = match value {
                Value::Null => continue,
                Value::String(s) if s.is_empty() => continue,
                Value::String(s) => s.clone(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => continue,
            };
            *slot = text;
            written += 1;
        }
        written
    }

    pub fn serialize(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(|v| !v.trim().is_empty())
    }
}

#[derive(Debug, Clone, Validate)]
struct InternshipDraft {
    #[validate(length(min = 3, message = "Internship title must be at least 3 characters"))]
    internship_title: String,
    #[validate(length(min = 2, message = "Industry domain must be at least 2 characters"))]
    industry_domain: String,
    #[validate(length(min = 2, message = "Duration must be specified"))]
    duration: String,
    #[validate(range(min = 0.0, max = 10.0, message = "Minimum GPA must be between 0.0 and 10.0"))]
    minimum_gpa: Option<f64>,
}

const VALIDATED_FIELDS: [&str; 4] = [
    "internship_title",
    "industry_domain",
    "duration",
    "minimum_gpa",
];

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// Validates a listing form and turns it into the payload sent on create and
/// update. All problems are reported together.
pub fn payload_from_form(form: &FormState) -> Result<InternshipPayload, ClientError> {
    let text = |name: &str| form.get(name).unwrap_or_default().trim().to_string();
    let mut errors = Vec::new();

    let missing: Vec<&str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|name| text(*name).is_empty())
        .collect();
    for name in &missing {
        errors.push(format!("{} is required", field_display_name(name)));
    }

    let gpa_raw = text("minimum_gpa");
    let minimum_gpa = if gpa_raw.is_empty() {
        None
    } else {
        match gpa_raw.parse::<f64>() {
            Ok(gpa) if gpa.is_finite() => Some(gpa),
            _ => {
                errors.push("Minimum GPA must be a valid number".to_string());
                None
            }
        }
    };

    let draft = InternshipDraft {
        internship_title: text("internship_title"),
        industry_domain: text("industry_domain"),
        duration: text("duration"),
        minimum_gpa,
    };
    if let Err(validation) = draft.validate() {
        let by_field = validation.field_errors();
        for name in VALIDATED_FIELDS {
            if missing.contains(&name) {
                continue;
            }
            let Some(field_errors) = by_field.get(name) else {
                continue;
            };
            for err in field_errors.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field_display_name(name)));
                errors.push(message);
            }
        }
    }

    let location_type = match text("location_type") {
        raw if raw.is_empty() => None,
        raw => match raw.parse::<LocationType>() {
            Ok(location) => Some(location),
            Err(_) => {
                errors.push("Invalid location type".to_string());
                None
            }
        },
    };
    let education_level = match text("education_level") {
        raw if raw.is_empty() => None,
        raw => match raw.parse::<EducationLevel>() {
            Ok(level) => Some(level),
            Err(_) => {
                errors.push("Invalid education level".to_string());
                None
            }
        },
    };

    let fulltime_conversion = match parse_flag(&text("fulltime_conversion")) {
        Some(flag) => flag,
        None => {
            errors.push("Full-time conversion must be true or false".to_string());
            false
        }
    };

    let (Some(location_type), Some(education_level), true) =
        (location_type, education_level, errors.is_empty())
    else {
        return Err(ClientError::Validation(errors));
    };

    Ok(InternshipPayload {
        internship_title: draft.internship_title,
        industry_domain: draft.industry_domain,
        location_type,
        education_level,
        duration: draft.duration,
        minimum_gpa: draft.minimum_gpa,
        stipend: text("stipend"),
        fulltime_conversion,
        required_skills: text("required_skills"),
        description: text("description"),
        past_intern_records: text("past_intern_records"),
    })
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
