// src/pipeline/aggregate.rs

//! Per-instructor report aggregation.

use crate::models::{ExamSession, ReportRow};

/// Group sessions by (course, instructor) and bucket exam days by month.
///
/// Groups keep first-seen order. Days within a bucket stay sorted and
/// deduplicated, so duplicate input sessions are harmless and running
/// the aggregation twice yields the same rows.
pub fn aggregate(sessions: &[ExamSession]) -> Vec<ReportRow> {
    let mut rows: Vec<ReportRow> = Vec::new();

    for session in sessions {
        let idx = rows
            .iter()
            .position(|row| {
                row.course_name == session.course_name
                    && row.instructor_name == session.instructor_name
            })
            .unwrap_or_else(|| {
                rows.push(ReportRow::new(
                    session.course_name.clone(),
                    session.instructor_name.clone(),
                ));
                rows.len() - 1
            });
        rows[idx].add_date(session.exam_date);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::month_columns;
    use crate::utils::dates::month_name;
    use chrono::NaiveDate;

    fn session(course: &str, instructor: &str, y: i32, m: u32, d: u32) -> ExamSession {
        ExamSession::new(course, instructor, NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_single_instructor_buckets_by_month() {
        let sessions = vec![
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 15),
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 28),
            session("MatematicaI", "ROSSI MARIO", 2025, 7, 12),
        ];

        let rows = aggregate(&sessions);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.total_dates, 3);
        assert_eq!(row.days_for(6).unwrap().joined_days(), "15/28");
        assert_eq!(row.days_for(7).unwrap().joined_days(), "12");
        assert_eq!(month_name(6), "Giugno");
        assert_eq!(month_name(7), "Luglio");
    }

    #[test]
    fn test_aggregation_is_idempotent_over_duplicates() {
        let mut sessions = vec![
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 15),
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 15),
            session("MatematicaI", "ROSSI MARIO", 2025, 7, 12),
        ];

        let once = aggregate(&sessions);
        sessions.extend(sessions.clone());
        let twice = aggregate(&sessions);

        assert_eq!(once, twice);
        assert_eq!(once[0].total_dates, 2);
        assert_eq!(once[0].days_for(6).unwrap().days, vec![15]);
    }

    #[test]
    fn test_groups_keep_first_seen_order() {
        let sessions = vec![
            session("Fisica", "VERDI ANNA", 2025, 6, 10),
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 15),
            session("Fisica", "VERDI ANNA", 2025, 7, 1),
            session("Fisica", "BIANCHI LUCIA", 2025, 6, 20),
        ];

        let rows = aggregate(&sessions);
        let keys: Vec<_> = rows
            .iter()
            .map(|r| (r.course_name.as_str(), r.instructor_name.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Fisica", "VERDI ANNA"),
                ("MatematicaI", "ROSSI MARIO"),
                ("Fisica", "BIANCHI LUCIA"),
            ]
        );
    }

    #[test]
    fn test_month_columns_over_rows() {
        let sessions = vec![
            session("Fisica", "VERDI ANNA", 2025, 12, 10),
            session("MatematicaI", "ROSSI MARIO", 2026, 1, 15),
            session("Fisica", "VERDI ANNA", 2025, 11, 2),
        ];

        let rows = aggregate(&sessions);
        // Window starting in November: Nov, Dec, Jan.
        assert_eq!(month_columns(&rows, 11), vec![11, 12, 1]);
    }
}
