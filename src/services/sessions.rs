// src/services/sessions.rs

//! Exam calendar parsing service.
//!
//! Fetches a course's exam calendar and parses each session row into a
//! structured record. The portal prints both the booking window and the
//! actual exam date in the same row; only the latter becomes a record.

use scraper::{ElementRef, Html, Selector};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{AppError, Result};
use crate::models::{Config, Course, ExamSession};
use crate::services::{FormParams, find_select_by_name, set_param};
use crate::utils::{dates, element_text, http};

/// Placeholder used when no cell looks like an instructor name.
pub const UNKNOWN_INSTRUCTOR: &str = "Docente non specificato";

/// Cell words that rule a cell out as an instructor name.
const NON_NAME_WORDS: [&str; 5] = ["scritto", "orale", "prova", "esame", "appello"];

/// A teaching activity listed for a course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: String,
    pub name: String,
}

/// Service fetching and parsing exam calendars.
pub struct SessionScraper<'a> {
    client: &'a reqwest::Client,
    config: &'a Config,
}

impl<'a> SessionScraper<'a> {
    /// Create a new session scraper.
    pub fn new(client: &'a reqwest::Client, config: &'a Config) -> Self {
        Self { client, config }
    }

    /// List the teaching activities offered by a course.
    pub async fn list_activities(
        &self,
        form: &FormParams,
        course: &Course,
    ) -> Result<Vec<Activity>> {
        let url = self.config.portal.exam_list_url()?;
        let mut params = form.clone();
        set_param(&mut params, "fac_id", &course.school_id);
        set_param(&mut params, "cds_id", &course.id);

        let document = http::post_form(self.client, &url, &params).await?;
        let select_name = &self.config.portal.activity_select_name;
        let select = find_select_by_name(&document, select_name).ok_or_else(|| {
            AppError::parse(format!("activity select '{select_name}' not found at {url}"))
        })?;

        let option_sel =
            Selector::parse("option").map_err(|e| AppError::parse(format!("{e:?}")))?;
        Ok(select
            .select(&option_sel)
            .filter_map(|option| {
                let id = option.value().attr("value").unwrap_or("").trim().to_string();
                let name = element_text(&option);
                if id.is_empty() || name.is_empty() {
                    return None;
                }
                Some(Activity { id, name })
            })
            .collect())
    }

    /// Search the exam calendar for one activity and parse its rows.
    pub async fn search_sessions(
        &self,
        form: &FormParams,
        course: &Course,
        activity: &Activity,
    ) -> Result<Vec<ExamSession>> {
        let url = self.config.portal.exam_list_url()?;
        let mut params = form.clone();
        set_param(&mut params, "fac_id", &course.school_id);
        set_param(&mut params, "cds_id", &course.id);
        set_param(&mut params, "ad_id", &activity.id);
        set_param(&mut params, "btnSubmit", "Avvia Ricerca");

        let document = http::post_form(self.client, &url, &params).await?;
        Ok(parse_exam_sessions(
            &document,
            &activity.name,
            &self.config.portal.result_row_selector,
        ))
    }
}

/// Parse every exam session in a calendar page.
///
/// Rows come from the portal's result table when present, falling back
/// to a scan of all tables with enough columns. Booking-only rows and
/// rows without a parseable exam date are dropped here, never surfaced.
pub fn parse_exam_sessions(
    document: &Html,
    course_name: &str,
    row_selector: &str,
) -> Vec<ExamSession> {
    let mut rows = rows_from_selector(document, row_selector, 3);
    if rows.is_empty() {
        rows = rows_from_tables(document);
    }

    let mut sessions = Vec::new();
    let mut booking_only = 0usize;
    let mut unparseable = 0usize;

    for cells in rows {
        match parse_session_row(&cells, course_name) {
            Some(session) if !session.is_booking_date => sessions.push(session),
            Some(_) => booking_only += 1,
            // Only rows that carried date-shaped text are worth a warning;
            // anything else is structural noise (headers, navigation).
            None if cells.iter().any(|c| dates::looks_dated(c)) => unparseable += 1,
            None => {}
        }
    }

    if booking_only > 0 {
        log::debug!("{booking_only} booking-only rows discarded for {course_name}");
    }
    if unparseable > 0 {
        log::warn!("{unparseable} rows without a parseable exam date skipped for {course_name}");
    }

    sessions
}

/// Rows matching the configured result-row selector.
fn rows_from_selector(document: &Html, row_selector: &str, min_cells: usize) -> Vec<Vec<String>> {
    let Ok(selector) = Selector::parse(row_selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(row_cells)
        .filter(|cells| cells.len() >= min_cells)
        .collect()
}

/// Fallback: scan every table for rows wide enough to be session rows.
fn rows_from_tables(document: &Html) -> Vec<Vec<String>> {
    let Ok(table_sel) = Selector::parse("table") else {
        return Vec::new();
    };
    let Ok(row_sel) = Selector::parse("tr") else {
        return Vec::new();
    };

    let mut rows = Vec::new();
    for table in document.select(&table_sel) {
        for row in table.select(&row_sel) {
            let cells = row_cells(row);
            if cells.len() >= 5 {
                rows.push(cells);
            }
        }
    }
    rows
}

fn row_cells(row: ElementRef) -> Vec<String> {
    let Ok(cell_sel) = Selector::parse("td") else {
        return Vec::new();
    };
    row.select(&cell_sel).map(|cell| element_text(&cell)).collect()
}

/// Parse one calendar row into a session record.
///
/// The actual exam date is the first parseable date outside booking
/// cells. When only a booking window parses, the record is flagged so
/// the caller can count what it drops. Returns `None` when the row
/// holds no usable date at all.
fn parse_session_row(cells: &[String], course_name: &str) -> Option<ExamSession> {
    if cells.len() < 2 {
        return None;
    }

    let exam_date = cells
        .iter()
        .filter(|text| !dates::is_booking_range(text))
        .find_map(|text| dates::parse_first_date(text));

    let instructor = find_instructor(cells);

    match exam_date {
        Some(date) => Some(ExamSession::new(course_name, instructor, date)),
        None => {
            let booking_date = cells
                .iter()
                .filter(|text| dates::is_booking_range(text))
                .find_map(|text| dates::parse_first_date(text))?;
            Some(ExamSession {
                course_name: course_name.to_string(),
                instructor_name: instructor,
                exam_date: booking_date,
                is_booking_date: true,
            })
        }
    }
}

/// Pick the cell that looks like an instructor name.
///
/// The portal's full layout carries the instructor in the fifth column;
/// shorter layouts fall back to a name-shaped-cell scan that skips the
/// leading exam label.
fn find_instructor(cells: &[String]) -> String {
    if let Some(cell) = cells.get(4) {
        if looks_like_name(cell) {
            return cell.trim().to_string();
        }
    }

    cells
        .iter()
        .skip(1)
        .find(|cell| looks_like_name(cell))
        .map(|cell| cell.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string())
}

/// At least two words, a capitalized one among them, no digits, and no
/// exam-type keywords.
fn looks_like_name(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() || text.chars().any(|c| c.is_ascii_digit()) {
        return false;
    }

    let words: Vec<&str> = text.unicode_words().collect();
    if words.len() < 2 {
        return false;
    }
    if words
        .iter()
        .any(|w| NON_NAME_WORDS.contains(&w.to_lowercase().as_str()))
    {
        return false;
    }
    words
        .iter()
        .any(|w| w.chars().next().is_some_and(char::is_uppercase))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ROW_SELECTOR: &str = "tr.rigaElenco";

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    const CALENDAR_PAGE: &str = r#"
        <table>
        <tr><td>Appello</td><td>Iscrizioni</td><td>Data</td><td>Tipo</td><td>Docente</td></tr>
        <tr class="rigaElenco">
            <td>ANALISI MATEMATICA I</td>
            <td>dal 01/06/2025 al 10/06/2025</td>
            <td>15/06/2025 - 09:30</td>
            <td>Scritto</td>
            <td>ROSSI MARIO</td>
        </tr>
        <tr class="rigaElenco">
            <td>ANALISI MATEMATICA I</td>
            <td>dal 20/06/2025 al 26/06/2025</td>
            <td>28/06/2025 - 09:30</td>
            <td>Orale</td>
            <td>ROSSI MARIO</td>
        </tr>
        </table>
    "#;

    #[test]
    fn test_exam_date_wins_over_booking_range() {
        let document = Html::parse_document(CALENDAR_PAGE);
        let sessions = parse_exam_sessions(&document, "ANALISI MATEMATICA I", ROW_SELECTOR);

        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].exam_date, date(2025, 6, 15));
        assert_eq!(sessions[1].exam_date, date(2025, 6, 28));
        assert!(sessions.iter().all(|s| !s.is_booking_date));
        assert!(sessions.iter().all(|s| s.instructor_name == "ROSSI MARIO"));
    }

    #[test]
    fn test_booking_only_row_is_discarded() {
        let document = Html::parse_document(
            r#"<table><tr class="rigaElenco">
                 <td>ANALISI MATEMATICA I</td>
                 <td>dal 01/06/2025 al 10/06/2025</td>
                 <td>da definire</td>
               </tr></table>"#,
        );
        let sessions = parse_exam_sessions(&document, "ANALISI MATEMATICA I", ROW_SELECTOR);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_fallback_table_scan_without_row_class() {
        let document = Html::parse_document(
            r#"<table>
                 <tr><th>Appello</th></tr>
                 <tr>
                   <td>FISICA GENERALE</td>
                   <td>dal 01/07/2025 al 09/07/2025</td>
                   <td>12/07/2025 - 11:00</td>
                   <td>Scritto</td>
                   <td>VERDI ANNA</td>
                 </tr>
               </table>"#,
        );
        let sessions = parse_exam_sessions(&document, "FISICA GENERALE", ROW_SELECTOR);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exam_date, date(2025, 7, 12));
        assert_eq!(sessions[0].instructor_name, "VERDI ANNA");
    }

    #[test]
    fn test_unparseable_date_row_is_dropped() {
        let document = Html::parse_document(
            r#"<table><tr class="rigaElenco">
                 <td>CHIMICA</td>
                 <td>31/02/2025 - 09:30</td>
                 <td>Scritto</td>
               </tr></table>"#,
        );
        let sessions = parse_exam_sessions(&document, "CHIMICA", ROW_SELECTOR);
        assert!(sessions.is_empty());
    }

    #[test]
    fn test_instructor_defaults_when_missing() {
        let document = Html::parse_document(
            r#"<table><tr class="rigaElenco">
                 <td>CHIMICA</td>
                 <td>15/06/2025 - 09:30</td>
                 <td>Scritto</td>
               </tr></table>"#,
        );
        let sessions = parse_exam_sessions(&document, "CHIMICA", ROW_SELECTOR);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].instructor_name, UNKNOWN_INSTRUCTOR);
    }

    #[test]
    fn test_textual_date_cell() {
        let document = Html::parse_document(
            r#"<table><tr class="rigaElenco">
                 <td>STORIA MODERNA</td>
                 <td>15 giugno 2025</td>
                 <td>Orale</td>
                 <td>BIANCHI LUCIA</td>
               </tr></table>"#,
        );
        let sessions = parse_exam_sessions(&document, "STORIA MODERNA", ROW_SELECTOR);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].exam_date, date(2025, 6, 15));
        assert_eq!(sessions[0].instructor_name, "BIANCHI LUCIA");
    }
}
