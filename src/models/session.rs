// src/models/session.rs

//! Exam session records.

use chrono::NaiveDate;
use serde::Serialize;

/// One scheduled exam occurrence parsed from a calendar row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExamSession {
    /// Teaching activity the exam belongs to
    pub course_name: String,

    /// Instructor holding the exam
    pub instructor_name: String,

    /// The actual exam date (never a booking-window date)
    pub exam_date: NaiveDate,

    /// True when the only date in the row came from a booking window.
    /// Such records never propagate past the parser.
    pub is_booking_date: bool,
}

impl ExamSession {
    /// A true exam occurrence.
    pub fn new(
        course_name: impl Into<String>,
        instructor_name: impl Into<String>,
        exam_date: NaiveDate,
    ) -> Self {
        Self {
            course_name: course_name.into(),
            instructor_name: instructor_name.into(),
            exam_date,
            is_booking_date: false,
        }
    }
}
