// src/pipeline/filter.rs

//! Forward-looking search window.

use chrono::{Months, NaiveDate};

use crate::error::{AppError, Result};
use crate::models::ExamSession;

/// Maximum forward window in months.
pub const MAX_MONTHS: u32 = 12;

/// A half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl SearchWindow {
    /// Build a window of `months` calendar months from `start`.
    ///
    /// Month arithmetic is calendar-based, not a fixed day count: one
    /// month from March 15 ends on April 15 exactly.
    pub fn new(start: NaiveDate, months: u32) -> Result<Self> {
        if months == 0 || months > MAX_MONTHS {
            return Err(AppError::config(format!(
                "months must be between 1 and {MAX_MONTHS}, got {months}"
            )));
        }
        let end = start
            .checked_add_months(Months::new(months))
            .ok_or_else(|| AppError::config("search window end is out of range"))?;
        Ok(Self { start, end })
    }

    /// Start-inclusive, end-exclusive containment.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Keep only sessions whose exam date falls inside the window.
pub fn filter_by_window(sessions: Vec<ExamSession>, window: &SearchWindow) -> Vec<ExamSession> {
    sessions
        .into_iter()
        .filter(|session| window.contains(session.exam_date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn session(d: NaiveDate) -> ExamSession {
        ExamSession::new("MatematicaI", "ROSSI MARIO", d)
    }

    #[test]
    fn test_window_rejects_zero_and_oversized_months() {
        let today = date(2025, 3, 15);
        assert!(SearchWindow::new(today, 0).is_err());
        assert!(SearchWindow::new(today, 13).is_err());
        assert!(SearchWindow::new(today, 1).is_ok());
        assert!(SearchWindow::new(today, 12).is_ok());
    }

    #[test]
    fn test_one_month_window_boundaries() {
        let window = SearchWindow::new(date(2025, 3, 15), 1).unwrap();

        let kept = filter_by_window(
            vec![
                session(date(2025, 3, 15)),
                session(date(2025, 4, 14)),
                session(date(2025, 4, 15)),
                session(date(2025, 4, 16)),
            ],
            &window,
        );

        let days: Vec<_> = kept.iter().map(|s| s.exam_date).collect();
        // Start inclusive, end exclusive.
        assert_eq!(days, vec![date(2025, 3, 15), date(2025, 4, 14)]);
    }

    #[test]
    fn test_calendar_month_arithmetic_crosses_year() {
        let window = SearchWindow::new(date(2025, 11, 15), 3).unwrap();
        assert_eq!(window.end, date(2026, 2, 15));
        assert!(window.contains(date(2026, 1, 31)));
        assert!(!window.contains(date(2026, 2, 15)));
    }

    #[test]
    fn test_past_sessions_are_excluded() {
        let window = SearchWindow::new(date(2025, 3, 15), 6).unwrap();
        assert!(!window.contains(date(2025, 3, 14)));
    }
}
