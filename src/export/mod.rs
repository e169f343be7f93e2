// src/export/mod.rs

//! Report emission.
//!
//! The pipeline hands the emitter two artifacts: the raw session records
//! and the aggregated per-instructor table. Serialization is a thin
//! adapter behind the [`ReportSink`] trait so other formats can slot in.

mod csv;

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ExamSession, ReportRow};

pub use csv::CsvSink;

/// Sink for the two report artifacts.
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// Write the raw session records; returns the file written.
    async fn write_raw(&self, sessions: &[ExamSession]) -> Result<PathBuf>;

    /// Write the aggregated per-instructor table; returns the file
    /// written. Month columns cover the months present in at least one
    /// row, chronologically from `start_month`.
    async fn write_report(&self, rows: &[ReportRow], start_month: u32) -> Result<PathBuf>;
}
