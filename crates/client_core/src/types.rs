use std::collections::BTreeMap;

use shared::protocol::{ListQuery, PaginationMeta};

pub const DEFAULT_PER_PAGE: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FilterKey {
    Search,
    Industry,
    Location,
    Education,
}

impl FilterKey {
    pub const ALL: [FilterKey; 4] = [
        Self::Search,
        Self::Industry,
        Self::Location,
        Self::Education,
    ];

    pub fn query_param(self) -> &'static str {
        match self {
            Self::Search => "q",
            Self::Industry => "industry",
            Self::Location => "location_type",
            Self::Education => "education_level",
        }
    }

    /// Free text is typed character by character, facets are picked from a
    /// closed list.
    pub fn is_debounced(self) -> bool {
        matches!(self, Self::Search)
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "search" | "q" => Some(Self::Search),
            "industry" => Some(Self::Industry),
            "location" | "location_type" => Some(Self::Location),
            "education" | "education_level" => Some(Self::Education),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    values: BTreeMap<FilterKey, String>,
}

impl FilterState {
    /// Stores a trimmed value; blank input removes the filter. Returns whether
    /// the state changed.
    pub fn set(&mut self, key: FilterKey, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return self.values.remove(&key).is_some();
        }
        match self.values.get(&key) {
            Some(current) if current == value => false,
            _ => {
                self.values.insert(key, value.to_string());
                true
            }
        }
    }

    pub fn get(&self, key: FilterKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_query(&self, page: &PageState) -> ListQuery {
        let owned = |key| self.get(key).map(str::to_string);
        ListQuery {
            q: owned(FilterKey::Search),
            industry: owned(FilterKey::Industry),
            location_type: owned(FilterKey::Location),
            education_level: owned(FilterKey::Education),
            page: page.current_page,
            per_page: page.per_page,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl PageState {
    pub fn new(per_page: u32) -> Self {
        Self {
            current_page: 1,
            per_page: per_page.max(1),
            total: 0,
            total_pages: 0,
        }
    }

    /// Target page for a relative move, or `None` when it leaves
    /// `[1, total_pages]`.
    pub fn offset(&self, delta: i64) -> Option<u32> {
        let target = i64::from(self.current_page).checked_add(delta)?;
        if target < 1 || target > i64::from(self.total_pages) {
            return None;
        }
        u32::try_from(target).ok()
    }

    pub fn apply(&mut self, meta: PaginationMeta) {
        self.total = meta.total;
        self.total_pages = meta.pages;
        self.clamp();
    }

    pub fn clamp(&mut self) {
        let upper = self.total_pages.max(1);
        self.current_page = self.current_page.clamp(1, upper);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PER_PAGE)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Error(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filter_value_removes_key() {
        let mut filters = FilterState::default();
        assert!(filters.set(FilterKey::Industry, " Software "));
        assert_eq!(filters.get(FilterKey::Industry), Some("Software"));
        assert!(!filters.set(FilterKey::Industry, "Software"));
        assert!(filters.set(FilterKey::Industry, "   "));
        assert!(filters.is_empty());
    }

    #[test]
    fn filter_names_accept_short_and_wire_forms() {
        for key in FilterKey::ALL {
            assert_eq!(FilterKey::parse(key.query_param()), Some(key));
        }
        assert_eq!(FilterKey::parse("location"), Some(FilterKey::Location));
        assert_eq!(FilterKey::parse("search"), Some(FilterKey::Search));
        assert_eq!(FilterKey::parse("company"), None);
    }

    #[test]
    fn query_maps_filter_keys_to_params() {
        let mut filters = FilterState::default();
        filters.set(FilterKey::Location, "Remote");
        filters.set(FilterKey::Education, "Graduate");
        let query = filters.to_query(&PageState::default());
        assert_eq!(query.location_type.as_deref(), Some("Remote"));
        assert_eq!(query.education_level.as_deref(), Some("Graduate"));
        assert_eq!(query.q, None);
        assert_eq!((query.page, query.per_page), (1, 12));
    }

    #[test]
    fn offset_stays_inside_known_pages() {
        let mut page = PageState::default();
        assert_eq!(page.offset(1), None);

        page.apply(PaginationMeta { total: 30, pages: 3 });
        assert_eq!(page.offset(1), Some(2));
        assert_eq!(page.offset(-1), None);
        assert_eq!(page.offset(3), None);
        assert_eq!(page.offset(i64::MAX), None);
    }

    #[test]
    fn apply_clamps_current_page() {
        let mut page = PageState::default();
        page.current_page = 5;
        page.apply(PaginationMeta { total: 20, pages: 2 });
        assert_eq!(page.current_page, 2);

        page.apply(PaginationMeta { total: 0, pages: 0 });
        assert_eq!(page.current_page, 1);
    }
}
