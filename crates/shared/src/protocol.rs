use serde::{Deserialize, Serialize};

use crate::domain::{EducationLevel, Internship, InternshipId, LocationType};

/// Query string for a paged listing request.
///
/// Field order is the order parameters appear on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education_level: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl ListQuery {
    pub fn is_search(&self) -> bool {
        self.q.as_deref().is_some_and(|q| !q.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, alias = "internships")]
    pub items: Vec<Internship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
}

impl ListResponse {
    /// Pagination as the server reported it, or a single page when the
    /// endpoint only returns a count (search and per-company listings).
    pub fn effective_pagination(&self) -> PaginationMeta {
        match self.pagination {
            Some(meta) => meta,
            None => PaginationMeta {
                total: self.count.unwrap_or(self.items.len() as u64),
                pages: 1,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub location_types: Vec<String>,
    #[serde(default)]
    pub education_levels: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersResponse {
    #[serde(default)]
    pub filters: FilterOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResponse {
    #[serde(alias = "internship")]
    pub item: Internship,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationResponse {
    #[serde(default, alias = "internship", skip_serializing_if = "Option::is_none")]
    pub item: Option<Internship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Full field set sent on create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternshipPayload {
    pub internship_title: String,
    pub industry_domain: String,
    pub location_type: LocationType,
    pub education_level: EducationLevel,
    pub duration: String,
    pub minimum_gpa: Option<f64>,
    pub stipend: String,
    pub fulltime_conversion: bool,
    pub required_skills: String,
    pub description: String,
    pub past_intern_records: String,
}

/// Body of `POST generate_recommendations`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRecommendationsRequest {
    pub force_refresh: bool,
}

/// Stored or freshly generated recommendations. Only `detailed_internships` is
/// rendered; `recommendations` keeps the ranked ids.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    #[serde(default)]
    pub recommendations: Vec<InternshipId>,
    #[serde(default)]
    pub detailed_internships: Vec<Internship>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}
