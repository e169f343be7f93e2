// src/services/mod.rs

//! Service layer for the scraper application.
//!
//! This module contains the business logic for:
//! - School/course discovery (`CatalogService`)
//! - Fuzzy course matching (`matcher`)
//! - Exam calendar parsing (`SessionScraper`)

mod catalog;
pub mod matcher;
mod sessions;

pub use catalog::{CatalogService, PageStructure};
pub use sessions::{Activity, SessionScraper, parse_exam_sessions};

use scraper::{ElementRef, Html, Selector};

/// Form parameters carried between portal requests.
pub type FormParams = Vec<(String, String)>;

/// Set a form parameter, appending it when absent.
pub(crate) fn set_param(params: &mut FormParams, name: &str, value: &str) {
    match params.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value.to_string(),
        None => params.push((name.to_string(), value.to_string())),
    }
}

/// Find a `<select>` element by its `name` attribute.
pub(crate) fn find_select_by_name<'a>(document: &'a Html, name: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!("select[name=\"{name}\"]")).ok()?;
    document.select(&selector).next()
}
