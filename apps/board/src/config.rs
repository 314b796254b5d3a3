use std::{fs, io::ErrorKind, path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use client_core::ListSettings;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub collection_path: String,
    /// Prefix of the recommendation endpoints.
    pub api_path: String,
    pub per_page: u32,
    pub search_debounce_ms: u64,
    pub error_notice_ms: u64,
    pub success_notice_ms: u64,
    pub session_cookie: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5001".into(),
            collection_path: "/api/internships".into(),
            api_path: "/api".into(),
            per_page: 12,
            search_debounce_ms: 500,
            error_notice_ms: 5000,
            success_notice_ms: 3000,
            session_cookie: None,
        }
    }
}

impl Settings {
    pub fn list_settings(&self) -> ListSettings {
        ListSettings {
            per_page: self.per_page,
            search_debounce: Duration::from_millis(self.search_debounce_ms),
            error_notice_ttl: Duration::from_millis(self.error_notice_ms),
            success_notice_ttl: Duration::from_millis(self.success_notice_ms),
        }
    }
}

/// Keys accepted in `board.toml`. Anything left out keeps its default.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    api_base_url: Option<String>,
    collection_path: Option<String>,
    api_path: Option<String>,
    per_page: Option<u32>,
    search_debounce_ms: Option<u64>,
    error_notice_ms: Option<u64>,
    success_notice_ms: Option<u64>,
    session_cookie: Option<String>,
}

/// Defaults, then the TOML file if it exists, then `APP__*` variables.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let mut settings = Settings::default();

    match fs::read_to_string(path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.api_base_url {
        settings.api_base_url = v;
    }
    if let Some(v) = file.collection_path {
        settings.collection_path = v;
    }
    if let Some(v) = file.api_path {
        settings.api_path = v;
    }
    if let Some(v) = file.per_page {
        settings.per_page = v;
    }
    if let Some(v) = file.search_debounce_ms {
        settings.search_debounce_ms = v;
    }
    if let Some(v) = file.error_notice_ms {
        settings.error_notice_ms = v;
    }
    if let Some(v) = file.success_notice_ms {
        settings.success_notice_ms = v;
    }
    if file.session_cookie.is_some() {
        settings.session_cookie = file.session_cookie;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__COLLECTION_PATH") {
        settings.collection_path = v;
    }
    if let Some(v) = lookup("APP__API_PATH") {
        settings.api_path = v;
    }
    if let Some(v) = lookup("APP__PER_PAGE") {
        settings.per_page = parse_number("APP__PER_PAGE", &v)?;
    }
    if let Some(v) = lookup("APP__SEARCH_DEBOUNCE_MS") {
        settings.search_debounce_ms = parse_number("APP__SEARCH_DEBOUNCE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__ERROR_NOTICE_MS") {
        settings.error_notice_ms = parse_number("APP__ERROR_NOTICE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__SUCCESS_NOTICE_MS") {
        settings.success_notice_ms = parse_number("APP__SUCCESS_NOTICE_MS", &v)?;
    }
    if let Some(v) = lookup("APP__SESSION_COOKIE") {
        settings.session_cookie = Some(v).filter(|cookie| !cookie.trim().is_empty());
    }

    if settings.per_page == 0 {
        bail!("per_page must be at least 1");
    }
    Ok(())
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("{key} must be a non-negative integer, got '{raw}'"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
