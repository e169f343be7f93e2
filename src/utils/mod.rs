// src/utils/mod.rs

//! Utility functions and helpers.

pub mod dates;
pub mod http;

use scraper::ElementRef;

/// Collect an element's text content and collapse runs of whitespace.
pub fn element_text(element: &ElementRef) -> String {
    let text: String = element.text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
