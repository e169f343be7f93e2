// src/utils/dates.rs

//! Locale-aware date parsing for portal markup.
//!
//! Calendar cells mix formats: "03/07/2025 - 09:30", "15 giugno 2025",
//! booking windows like "dal 01/06/2025 al 10/06/2025". Everything here
//! parses to a plain [`NaiveDate`] or not at all; nothing is defaulted.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

/// Month names in the portal's locale, indexed by month number - 1.
pub const MONTH_NAMES: [&str; 12] = [
    "Gennaio",
    "Febbraio",
    "Marzo",
    "Aprile",
    "Maggio",
    "Giugno",
    "Luglio",
    "Agosto",
    "Settembre",
    "Ottobre",
    "Novembre",
    "Dicembre",
];

/// Localized name of a month (1-12).
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "",
    }
}

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

fn numeric_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"))
}

fn textual_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2})\s+([a-zà-ù]+)\s+(\d{4})\b").expect("valid regex")
    })
}

fn booking_range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\bdal\b.+\bal\b").expect("valid regex"))
}

/// True when the text is a booking window ("dal 01/06/2025 al 10/06/2025").
pub fn is_booking_range(text: &str) -> bool {
    booking_range_re().is_match(text)
}

/// True when the text carries something shaped like a numeric date,
/// whether or not it is a valid calendar day.
pub fn looks_dated(text: &str) -> bool {
    numeric_date_re().is_match(text)
}

/// Extract the first calendar date from free-form cell text.
///
/// Numeric dd/mm/yyyy is tried first, then textual forms like
/// "15 giugno 2025". Candidates that are not valid calendar days are
/// skipped, not clamped.
pub fn parse_first_date(text: &str) -> Option<NaiveDate> {
    for caps in numeric_date_re().captures_iter(text) {
        let (day, month, year) = capture_dmy(&caps)?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    for caps in textual_date_re().captures_iter(text) {
        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        let month = month_number(caps.get(2)?.as_str())?;
        let year: i32 = caps.get(3)?.as_str().parse().ok()?;
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }

    None
}

/// Parse a strict dd/mm/yyyy date (CLI `--start-date`).
pub fn parse_numeric_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%d/%m/%Y").ok()
}

fn capture_dmy(caps: &regex::Captures) -> Option<(u32, u32, i32)> {
    let day = caps.get(1)?.as_str().parse().ok()?;
    let month = caps.get(2)?.as_str().parse().ok()?;
    let year = caps.get(3)?.as_str().parse().ok()?;
    Some((day, month, year))
}
