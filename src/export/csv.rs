// src/export/csv.rs

//! CSV report files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Local;

use crate::error::{AppError, Result};
use crate::export::ReportSink;
use crate::models::{ExamSession, ReportRow, month_columns};
use crate::utils::dates::month_name;

/// Writes the two artifacts as timestamped CSV files.
pub struct CsvSink {
    directory: PathBuf,
    basename: String,
}

impl CsvSink {
    /// Create a sink writing `<basename>_<kind>_<timestamp>.csv` files
    /// under `directory`.
    pub fn new(directory: impl AsRef<Path>, basename: impl Into<String>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
            basename: basename.into(),
        }
    }

    fn timestamped_path(&self, kind: &str) -> PathBuf {
        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        self.directory
            .join(format!("{}_{kind}_{stamp}.csv", self.basename))
    }

    fn raw_bytes(sessions: &[ExamSession]) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Nome_Insegnamento", "Professore", "Data_Esame"])?;
        for session in sessions {
            let exam_date = session.exam_date.format("%d/%m/%Y").to_string();
            writer.write_record([
                session.course_name.as_str(),
                session.instructor_name.as_str(),
                exam_date.as_str(),
            ])?;
        }
        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }

    fn report_bytes(rows: &[ReportRow], start_month: u32) -> Result<Vec<u8>> {
        let months = month_columns(rows, start_month);

        let mut writer = csv::Writer::from_writer(Vec::new());
        let mut header = vec![
            "Nome_Insegnamento".to_string(),
            "Professore".to_string(),
            "Totale_Date".to_string(),
        ];
        header.extend(months.iter().map(|m| month_name(*m).to_string()));
        writer.write_record(&header)?;

        for row in rows {
            let mut record = vec![
                row.course_name.clone(),
                row.instructor_name.clone(),
                row.total_dates.to_string(),
            ];
            record.extend(months.iter().map(|m| {
                row.days_for(*m)
                    .map(|bucket| bucket.joined_days())
                    .unwrap_or_default()
            }));
            writer.write_record(&record)?;
        }

        writer
            .into_inner()
            .map_err(|e| AppError::Io(e.into_error()))
    }
}

#[async_trait]
impl ReportSink for CsvSink {
    async fn write_raw(&self, sessions: &[ExamSession]) -> Result<PathBuf> {
        let path = self.timestamped_path("raw");
        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(&path, Self::raw_bytes(sessions)?).await?;
        Ok(path)
    }

    async fn write_report(&self, rows: &[ReportRow], start_month: u32) -> Result<PathBuf> {
        let path = self.timestamped_path("report");
        tokio::fs::create_dir_all(&self.directory).await?;
        tokio::fs::write(&path, Self::report_bytes(rows, start_month)?).await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::aggregate::aggregate;
    use chrono::NaiveDate;

    fn session(course: &str, instructor: &str, y: i32, m: u32, d: u32) -> ExamSession {
        ExamSession::new(course, instructor, NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn report_text(rows: &[ReportRow], start_month: u32) -> String {
        String::from_utf8(CsvSink::report_bytes(rows, start_month).unwrap()).unwrap()
    }

    #[test]
    fn test_raw_bytes_layout() {
        let sessions = vec![session("MatematicaI", "ROSSI MARIO", 2025, 6, 15)];
        let text = String::from_utf8(CsvSink::raw_bytes(&sessions).unwrap()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "Nome_Insegnamento,Professore,Data_Esame");
        assert_eq!(lines[1], "MatematicaI,ROSSI MARIO,15/06/2025");
    }

    #[test]
    fn test_report_header_and_cells() {
        let rows = aggregate(&[
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 15),
            session("MatematicaI", "ROSSI MARIO", 2025, 6, 28),
            session("MatematicaI", "ROSSI MARIO", 2025, 7, 12),
        ]);

        let text = report_text(&rows, 6);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Nome_Insegnamento,Professore,Totale_Date,Giugno,Luglio"
        );
        assert_eq!(lines[1], "MatematicaI,ROSSI MARIO,3,15/28,12");
    }

    #[test]
    fn test_report_month_columns_cycle_from_start_month() {
        let rows = aggregate(&[
            session("Fisica", "VERDI ANNA", 2025, 12, 10),
            session("Fisica", "VERDI ANNA", 2026, 1, 20),
            session("Fisica", "VERDI ANNA", 2025, 11, 5),
        ]);

        let text = report_text(&rows, 11);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Nome_Insegnamento,Professore,Totale_Date,Novembre,Dicembre,Gennaio"
        );
        assert_eq!(lines[1], "Fisica,VERDI ANNA,3,5,10,20");
    }

    #[test]
    fn test_report_empty_cell_for_month_without_dates() {
        let rows = aggregate(&[
            session("Fisica", "VERDI ANNA", 2025, 6, 10),
            session("Chimica", "BIANCHI LUCIA", 2025, 7, 2),
        ]);

        let text = report_text(&rows, 6);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[1], "Fisica,VERDI ANNA,1,10,");
        assert_eq!(lines[2], "Chimica,BIANCHI LUCIA,1,,2");
    }
}
