// src/pipeline/mod.rs

//! Pipeline stages and entry points.
//!
//! - `run_report`: full extraction, discovery through emission
//! - `filter` / `aggregate`: pure stages between parser and emitter
//! - `select_run_params`: interactive parameter selection

pub mod aggregate;
pub mod filter;
mod interactive;
mod report;

pub use filter::{SearchWindow, filter_by_window};
pub use interactive::{RunParams, select_run_params};
pub use report::run_report;
