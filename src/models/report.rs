// src/models/report.rs

//! Aggregated report rows.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Exam days within one calendar month.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MonthBucket {
    /// Month number, 1-12
    pub month: u32,

    /// Days of month with an exam, sorted ascending, no duplicates
    pub days: Vec<u32>,
}

impl MonthBucket {
    /// Render the day list as a report cell ("15/28").
    pub fn joined_days(&self) -> String {
        self.days
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// One row of the per-instructor report.
///
/// Invariant: `total_dates` equals the sum of all bucket sizes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReportRow {
    pub course_name: String,
    pub instructor_name: String,
    pub total_dates: usize,
    pub months: Vec<MonthBucket>,
}

impl ReportRow {
    /// An empty row for a (course, instructor) pair.
    pub fn new(course_name: impl Into<String>, instructor_name: impl Into<String>) -> Self {
        Self {
            course_name: course_name.into(),
            instructor_name: instructor_name.into(),
            total_dates: 0,
            months: Vec::new(),
        }
    }

    /// Record one exam date, keeping days sorted and deduplicated.
    pub fn add_date(&mut self, date: NaiveDate) {
        let month = date.month();
        let idx = self
            .months
            .iter()
            .position(|b| b.month == month)
            .unwrap_or_else(|| {
                self.months.push(MonthBucket {
                    month,
                    days: Vec::new(),
                });
                self.months.len() - 1
            });

        let days = &mut self.months[idx].days;
        if let Err(pos) = days.binary_search(&date.day()) {
            days.insert(pos, date.day());
            self.total_dates += 1;
        }
    }

    /// Bucket for a month, if any exam day falls in it.
    pub fn days_for(&self, month: u32) -> Option<&MonthBucket> {
        self.months.iter().find(|b| b.month == month)
    }
}

/// Month columns for the aggregated table: months present in at least one
/// row, in chronological order starting from `start_month` (cyclic across
/// the year boundary).
pub fn month_columns(rows: &[ReportRow], start_month: u32) -> Vec<u32> {
    let mut months: Vec<u32> = rows
        .iter()
        .flat_map(|r| r.months.iter().map(|b| b.month))
        .collect();
    months.sort_by_key(|m| (m + 12 - start_month) % 12);
    months.dedup();
    months
}
