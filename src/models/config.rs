// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use scraper::Selector;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior
    #[serde(default)]
    pub http: HttpConfig,

    /// Portal endpoint and markup names
    #[serde(default)]
    pub portal: PortalConfig,

    /// Real-school filtering rules
    #[serde(default)]
    pub schools: SchoolFilter,

    /// Fuzzy course matching thresholds
    #[serde(default)]
    pub matcher: MatcherConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return defaults if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::debug!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if Url::parse(&self.portal.base_url).is_err() {
            return Err(AppError::config(format!(
                "portal.base_url is not a valid URL: {}",
                self.portal.base_url
            )));
        }
        if Selector::parse(&self.portal.result_row_selector).is_err() {
            return Err(AppError::config(format!(
                "portal.result_row_selector is not a valid CSS selector: {}",
                self.portal.result_row_selector
            )));
        }
        if self.portal.course_select_name.trim().is_empty()
            || self.portal.activity_select_name.trim().is_empty()
        {
            return Err(AppError::config("portal select names must not be empty"));
        }
        if self.schools.department_marker.trim().is_empty() {
            return Err(AppError::config("schools.department_marker is empty"));
        }
        if !(self.matcher.min_token_overlap > 0.0 && self.matcher.min_token_overlap <= 1.0) {
            return Err(AppError::config(
                "matcher.min_token_overlap must be in (0, 1]",
            ));
        }
        Ok(())
    }
}

/// HTTP client behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for portal requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Courtesy delay between sequential requests, in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
        }
    }
}

/// Portal endpoint and page-markup names.
///
/// The portal's HTML structure is an external contract; everything the
/// parsers look up by name lives here so markup drift is a config change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Portal root, e.g. "https://uniparthenope.esse3.cineca.it"
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Path of the exam-list search page
    #[serde(default = "defaults::exam_list_path")]
    pub exam_list_path: String,

    /// Academic year the searches are scoped to
    #[serde(default = "defaults::academic_year")]
    pub academic_year: String,

    /// Id of the course search form holding the hidden inputs
    #[serde(default = "defaults::search_form_id")]
    pub search_form_id: String,

    /// Candidate `name` attributes for the school select, tried in order
    #[serde(default = "defaults::school_select_names")]
    pub school_select_names: Vec<String>,

    /// Keywords matched against select id/class/name when no candidate hits
    #[serde(default = "defaults::school_select_keywords")]
    pub school_select_keywords: Vec<String>,

    /// `name` attribute of the course select
    #[serde(default = "defaults::course_select_name")]
    pub course_select_name: String,

    /// `name` attribute of the teaching-activity select
    #[serde(default = "defaults::activity_select_name")]
    pub activity_select_name: String,

    /// CSS selector for exam result rows
    #[serde(default = "defaults::result_row_selector")]
    pub result_row_selector: String,
}

impl PortalConfig {
    /// Absolute URL of the exam-list search page.
    pub fn exam_list_url(&self) -> Result<String> {
        let url = Url::parse(&self.base_url)?.join(&self.exam_list_path)?;
        Ok(url.to_string())
    }
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            exam_list_path: defaults::exam_list_path(),
            academic_year: defaults::academic_year(),
            search_form_id: defaults::search_form_id(),
            school_select_names: defaults::school_select_names(),
            school_select_keywords: defaults::school_select_keywords(),
            course_select_name: defaults::course_select_name(),
            activity_select_name: defaults::activity_select_name(),
            result_row_selector: defaults::result_row_selector(),
        }
    }
}

/// Rules separating real schools from generic department entries.
///
/// The portal lists both; only schools carry exam calendars we care
/// about. The marker is a naming heuristic observed on the portal, so it
/// stays configurable together with an allowlist for schools whose names
/// share the department wording.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchoolFilter {
    /// Prefix marking a generic department entry
    #[serde(default = "defaults::department_marker")]
    pub department_marker: String,

    /// Names accepted even when they carry the marker prefix
    #[serde(default)]
    pub allowlist: Vec<String>,

    /// How many schools to scan for courses (0 = all)
    #[serde(default = "defaults::scan_limit")]
    pub scan_limit: usize,
}

impl SchoolFilter {
    /// Single point of truth for the school-vs-department decision.
    pub fn is_real_school(&self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        if self
            .allowlist
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(name))
        {
            return true;
        }
        !name.starts_with(self.department_marker.as_str())
    }
}

impl Default for SchoolFilter {
    fn default() -> Self {
        Self {
            department_marker: defaults::department_marker(),
            allowlist: Vec::new(),
            scan_limit: defaults::scan_limit(),
        }
    }
}

/// Fuzzy course matching thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum fraction of query tokens present in a course name
    #[serde(default = "defaults::min_token_overlap")]
    pub min_token_overlap: f64,

    /// How many near-matches to list when a query finds nothing
    #[serde(default = "defaults::max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_token_overlap: defaults::min_token_overlap(),
            max_suggestions: defaults::max_suggestions(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Linux; x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/137.0.0.0 Safari/537.36"
            .to_string()
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn request_delay() -> u64 {
        500
    }

    pub fn base_url() -> String {
        "https://uniparthenope.esse3.cineca.it".to_string()
    }

    pub fn exam_list_path() -> String {
        "/ListaAppelliOfferta.do".to_string()
    }

    pub fn academic_year() -> String {
        "2025/2026".to_string()
    }

    pub fn search_form_id() -> String {
        "formRicercaCds".to_string()
    }

    pub fn school_select_names() -> Vec<String> {
        ["fac_id", "prov_cds", "dipartimento", "dip_id", "department", "facolta", "facolta_id"]
            .map(String::from)
            .to_vec()
    }

    pub fn school_select_keywords() -> Vec<String> {
        ["dipartimento", "facolta", "department", "faculty", "dip", "fac"]
            .map(String::from)
            .to_vec()
    }

    pub fn course_select_name() -> String {
        "cds_id".to_string()
    }

    pub fn activity_select_name() -> String {
        "ad_id".to_string()
    }

    pub fn result_row_selector() -> String {
        "tr.rigaElenco".to_string()
    }

    pub fn department_marker() -> String {
        "Dipartimento".to_string()
    }

    pub fn scan_limit() -> usize {
        3
    }

    pub fn min_token_overlap() -> f64 {
        0.5
    }

    pub fn max_suggestions() -> usize {
        5
    }
}
