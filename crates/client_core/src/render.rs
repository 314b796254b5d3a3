//! HTML for result cards and the pagination control.
//!
//! Every value that came from the backend goes through [`escape`]; only the
//! markup written here (badges, icons, layout classes) is emitted verbatim.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use shared::domain::Internship;

use crate::types::PageState;

pub const EMPTY_STATE_HTML: &str = r#"<div class="empty-state">No internships found</div>"#;

pub fn escape(text: &str) -> String {
    ammonia::clean_text(text)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaginationView {
    pub visible: bool,
    pub label: String,
    pub prev_enabled: bool,
    pub next_enabled: bool,
}

impl PaginationView {
    pub fn from_page(page: &PageState) -> Self {
        if page.total_pages <= 1 {
            return Self::default();
        }
        Self {
            visible: true,
            label: format!("Page {} of {}", page.current_page, page.total_pages),
            prev_enabled: page.current_page > 1,
            next_enabled: page.current_page < page.total_pages,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub cards: Vec<String>,
    pub empty_state: bool,
    pub pagination: PaginationView,
}

impl RenderedPage {
    pub fn html(&self) -> String {
        if self.empty_state {
            return EMPTY_STATE_HTML.to_string();
        }
        format!(
            r#"<div class="internships-grid">{}</div>"#,
            self.cards.concat()
        )
    }
}

pub fn render_page(items: &[Internship], page: &PageState) -> RenderedPage {
    RenderedPage {
        cards: items.iter().map(render_card).collect(),
        empty_state: items.is_empty(),
        pagination: PaginationView::from_page(page),
    }
}

fn location_badge_class(location_type: &str) -> &'static str {
    match location_type {
        "Remote" => "bg-green-100 text-green-800",
        "On-site" => "bg-blue-100 text-blue-800",
        "Hybrid" => "bg-purple-100 text-purple-800",
        _ => "bg-gray-100 text-gray-800",
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// `Jan 5, 2024` for ISO timestamps, the raw text for anything else.
pub fn format_date(raw: &str) -> String {
    const FORMAT: &str = "%b %-d, %Y";
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return parsed.format(FORMAT).to_string();
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return parsed.format(FORMAT).to_string();
    }
    raw.to_string()
}

fn detail_row(icon: &str, content: &str) -> String {
    format!(
        r#"<div class="detail"><i class="fas {icon}"></i><span>{content}</span></div>"#
    )
}

pub fn render_card(item: &Internship) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        r#"<div class="card" data-id="{}">"#,
        item.internship_id.0
    ));

    html.push_str(&format!(
        r#"<h3 class="card-title">{}</h3>"#,
        escape(item.internship_title.as_deref().unwrap_or_default())
    ));

    if let Some(company) = non_blank(&item.company_name) {
        html.push_str(&format!(
            r#"<p class="company">{}</p>"#,
            escape(company)
        ));
    }

    html.push_str(&detail_row(
        "fa-industry",
        &escape(item.industry_domain.as_deref().unwrap_or_default()),
    ));

    let location = item.location_type.as_deref().unwrap_or_default();
    html.push_str(&detail_row(
        "fa-map-marker-alt",
        &format!(
            r#"<span class="badge {}">{}</span>"#,
            location_badge_class(location),
            escape(location)
        ),
    ));

    html.push_str(&detail_row(
        "fa-graduation-cap",
        &escape(item.education_level.as_deref().unwrap_or_default()),
    ));
    html.push_str(&detail_row(
        "fa-clock",
        &escape(item.duration.as_deref().unwrap_or_default()),
    ));

    if let Some(stipend) = non_blank(&item.stipend) {
        html.push_str(&detail_row("fa-dollar-sign", &escape(stipend)));
    }
    if let Some(gpa) = item.minimum_gpa.filter(|gpa| *gpa > 0.0) {
        html.push_str(&detail_row("fa-chart-line", &format!("Min GPA: {gpa}")));
    }

    if item.fulltime_conversion == Some(true) {
        html.push_str(
            r#"<span class="badge bg-green-100 text-green-800"><i class="fas fa-arrow-up"></i>Full-time conversion available</span>"#,
        );
    }

    if let Some(description) = non_blank(&item.description) {
        html.push_str(&format!(
            r#"<p class="description">{}</p>"#,
            escape(description)
        ));
    }
    if let Some(skills) = non_blank(&item.required_skills) {
        html.push_str(&format!(
            r#"<div class="skills"><h4>Required Skills:</h4><p>{}</p></div>"#,
            escape(skills)
        ));
    }

    html.push_str(r#"<div class="dates">"#);
    if let Some(created) = non_blank(&item.created_at) {
        html.push_str(&format!(
            "<span>Added: {}</span>",
            escape(&format_date(created))
        ));
    }
    if let Some(updated) = non_blank(&item.updated_at) {
        if item.updated_at != item.created_at {
            html.push_str(&format!(
                "<span>Updated: {}</span>",
                escape(&format_date(updated))
            ));
        }
    }
    html.push_str("</div></div>");
    html
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
