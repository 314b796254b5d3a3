use super::*;
use shared::{domain::InternshipId, protocol::PaginationMeta};

fn item(id: i64, title: &str) -> Internship {
    Internship {
        internship_id: InternshipId(id),
        internship_title: Some(title.to_string()),
        industry_domain: Some("Software".into()),
        location_type: Some("Remote".into()),
        education_level: Some("Graduate".into()),
        duration: Some("3 months".into()),
        ..Internship::default()
    }
}

fn page_of(pages: u32, current: u32) -> PageState {
    let mut page = PageState::default();
    page.current_page = current;
    page.apply(PaginationMeta {
        total: u64::from(pages) * 12,
        pages,
    });
    page
}

#[test]
fn markup_in_item_fields_is_escaped() {
    let mut listing = item(1, "<script>x</script>");
    listing.description = Some(r#"<img src=x onerror="alert(1)">"#.into());
    listing.required_skills = Some("Rust & <b>SQL</b>".into());

    let card = render_card(&listing);

    assert!(card.contains("&lt;script&gt;x&lt;&#47;script&gt;"));
    assert!(!card.contains("<script>"));
    assert!(!card.contains("<img"));
    assert!(!card.contains("<b>SQL"));
    assert!(card.contains("Rust&#32;&amp;&#32;&lt;b&gt;SQL"));
}

#[test]
fn structural_markup_is_kept() {
    let card = render_card(&item(2, "Intern"));
    assert!(card.starts_with(r#"<div class="card" data-id="2">"#));
    assert!(card.contains(r#"<span class="badge bg-green-100 text-green-800">Remote</span>"#));
    assert!(card.contains(r#"<i class="fas fa-industry"></i>"#));
}

#[test]
fn optional_sections_only_render_when_present() {
    let bare = render_card(&item(3, "Intern"));
    assert!(!bare.contains("fa-dollar-sign"));
    assert!(!bare.contains("Min GPA"));
    assert!(!bare.contains("Full-time conversion available"));
    assert!(!bare.contains("Required Skills"));

    let mut rich = item(3, "Intern");
    rich.stipend = Some("Paid".into());
    rich.minimum_gpa = Some(7.5);
    rich.fulltime_conversion = Some(true);
    let card = render_card(&rich);
    assert!(card.contains("fa-dollar-sign"));
    assert!(card.contains("Min GPA: 7.5"));
    assert!(card.contains("Full-time conversion available"));
}

#[test]
fn unknown_location_gets_neutral_badge() {
    let mut listing = item(4, "Intern");
    listing.location_type = Some("Orbit".into());
    assert!(render_card(&listing).contains("bg-gray-100 text-gray-800"));
}

#[test]
fn empty_result_renders_empty_state_instead_of_cards() {
    let rendered = render_page(&[], &page_of(0, 1));
    assert!(rendered.empty_state);
    assert!(rendered.cards.is_empty());
    assert_eq!(rendered.html(), EMPTY_STATE_HTML);
    assert!(!rendered.html().contains("internships-grid"));
}

#[test]
fn single_page_hides_pagination() {
    let rendered = render_page(&[item(5, "Intern")], &page_of(1, 1));
    assert_eq!(rendered.cards.len(), 1);
    assert!(!rendered.empty_state);
    assert!(!rendered.pagination.visible);
}

#[test]
fn pagination_reports_position_and_bounds() {
    let first = PaginationView::from_page(&page_of(3, 1));
    assert!(first.visible);
    assert_eq!(first.label, "Page 1 of 3");
    assert!(!first.prev_enabled);
    assert!(first.next_enabled);

    let last = PaginationView::from_page(&page_of(3, 3));
    assert!(last.prev_enabled);
    assert!(!last.next_enabled);
}

#[test]
fn dates_are_formatted_when_parseable() {
    assert_eq!(format_date("2024-01-05T10:30:00.123456"), "Jan 5, 2024");
    assert_eq!(format_date("2024-03-15T08:00:00+00:00"), "Mar 15, 2024");
    assert_eq!(format_date("2024-12-01"), "Dec 1, 2024");
    assert_eq!(format_date("sometime"), "sometime");
}

#[test]
fn updated_date_only_shown_when_different() {
    let mut listing = item(6, "Intern");
    listing.created_at = Some("2024-01-05T10:30:00".into());
    listing.updated_at = listing.created_at.clone();
    assert!(!render_card(&listing).contains("Updated:"));

    listing.updated_at = Some("2024-02-01T10:30:00".into());
    assert!(render_card(&listing).contains("Updated:"));
}
