use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(InternshipId);
id_newtype!(CompanyId);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationType {
    #[serde(rename = "On-site")]
    OnSite,
    Remote,
    Hybrid,
}

impl LocationType {
    pub const ALL: [LocationType; 3] = [Self::OnSite, Self::Remote, Self::Hybrid];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnSite => "On-site",
            Self::Remote => "Remote",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "location type",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EducationLevel {
    #[serde(rename = "High School")]
    HighSchool,
    Undergraduate,
    Graduate,
    Postgraduate,
    #[serde(rename = "PhD")]
    Phd,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 5] = [
        Self::HighSchool,
        Self::Undergraduate,
        Self::Graduate,
        Self::Postgraduate,
        Self::Phd,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HighSchool => "High School",
            Self::Undergraduate => "Undergraduate",
            Self::Graduate => "Graduate",
            Self::Postgraduate => "Postgraduate",
            Self::Phd => "PhD",
        }
    }
}

impl fmt::Display for EducationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EducationLevel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "education level",
                value: s.to_string(),
            })
    }
}

/// One listing as returned by the backend.
///
/// Everything except the id is presentation data: the client never validates
/// these values, it only checks whether optional ones are present. Location and
/// education stay plain strings here so an unexpected value from the server
/// still renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Internship {
    pub internship_id: InternshipId,
    pub company_id: Option<CompanyId>,
    pub company_name: Option<String>,
    pub internship_title: Option<String>,
    pub industry_domain: Option<String>,
    pub location_type: Option<String>,
    pub education_level: Option<String>,
    pub duration: Option<String>,
    pub minimum_gpa: Option<f64>,
    pub stipend: Option<String>,
    pub fulltime_conversion: Option<bool>,
    pub required_skills: Option<String>,
    #[serde(alias = "job_description")]
    pub description: Option<String>,
    pub past_intern_records: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internship_reads_backend_record_shape() {
        let raw = r#"{
            "internship_id": 9,
            "company_id": 2,
            "company_name": null,
            "internship_title": "Data intern",
            "job_description": "Pipelines",
            "minimum_gpa": null,
            "fulltime_conversion": true,
            "unknown_field": "ignored"
        }"#;
        let item: Internship = serde_json::from_str(raw).expect("decode");
        assert_eq!(item.internship_id, InternshipId(9));
        assert_eq!(item.company_id, Some(CompanyId(2)));
        assert_eq!(item.description.as_deref(), Some("Pipelines"));
        assert_eq!(item.fulltime_conversion, Some(true));
        assert!(item.minimum_gpa.is_none());
    }

    #[test]
    fn closed_sets_parse_display_names_only() {
        assert_eq!("On-site".parse(), Ok(LocationType::OnSite));
        assert_eq!("PhD".parse(), Ok(EducationLevel::Phd));
        let err = "onsite".parse::<LocationType>().unwrap_err();
        assert_eq!(err.to_string(), "unknown location type: onsite");
    }

    #[test]
    fn ids_default_to_zero() {
        assert_eq!(Internship::default().internship_id, InternshipId(0));
        assert_eq!(CompanyId::default(), CompanyId(0));
    }
}
