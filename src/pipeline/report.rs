// src/pipeline/report.rs

//! End-to-end extraction pipeline.
//!
//! Discover the catalog, match the course, parse every activity's
//! calendar, filter to the search window, aggregate, and emit.

use std::time::Duration;

use chrono::Datelike;

use crate::error::{AppError, Result};
use crate::export::ReportSink;
use crate::models::{Config, ExamSession, ReportRow};
use crate::pipeline::aggregate::aggregate;
use crate::pipeline::filter::{SearchWindow, filter_by_window};
use crate::services::{CatalogService, SessionScraper, matcher};
use crate::utils::dates::month_name;

/// Run the full extraction for one course query.
pub async fn run_report(
    config: &Config,
    client: &reqwest::Client,
    sink: &dyn ReportSink,
    query: &str,
    window: &SearchWindow,
) -> Result<()> {
    let catalog_service = CatalogService::new(client, config);
    let form = catalog_service.fetch_search_form(window).await?;
    let catalog = catalog_service.discover(&form).await?;
    log::info!(
        "Discovered {} schools and {} courses",
        catalog.schools.len(),
        catalog.courses.len()
    );

    let matches = matcher::find_courses(&catalog.courses, query, &config.matcher);
    let Some(course) = matches.first() else {
        let suggestions =
            matcher::suggest(&catalog.courses, query, config.matcher.max_suggestions);
        if suggestions.is_empty() {
            log::error!("No course matching '{query}'");
        } else {
            log::error!("No course matching '{query}'. Closest names:");
            for course in suggestions {
                log::error!("  - {}", course.name);
            }
        }
        return Err(AppError::no_match(query));
    };
    log::info!("Matched course: {} (id {})", course.name, course.id);

    let scraper = SessionScraper::new(client, config);
    let activities = scraper.list_activities(&form, course).await?;
    if activities.is_empty() {
        return Err(AppError::parse(format!(
            "no teaching activities listed for {}",
            course.name
        )));
    }
    log::info!("Found {} teaching activities", activities.len());

    let delay = Duration::from_millis(config.http.request_delay_ms);
    let mut sessions: Vec<ExamSession> = Vec::new();
    for (idx, activity) in activities.iter().enumerate() {
        log::info!("[{}/{}] {}", idx + 1, activities.len(), activity.name);
        match scraper.search_sessions(&form, course, activity).await {
            Ok(found) => {
                log::debug!("  {} sessions", found.len());
                sessions.extend(found);
            }
            Err(e) => log::warn!("  calendar fetch failed for {}: {e}", activity.name),
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    if sessions.is_empty() {
        log::warn!("No exam sessions found for {}", course.name);
        return Ok(());
    }
    log::info!("Collected {} raw sessions", sessions.len());

    let filtered = filter_by_window(sessions.clone(), window);
    log::info!(
        "{} sessions between {} and {}",
        filtered.len(),
        window.start.format("%d/%m/%Y"),
        window.end.format("%d/%m/%Y")
    );

    let rows = aggregate(&filtered);
    print_summary(&rows);

    let raw_path = sink.write_raw(&sessions).await?;
    log::info!("Raw records written to {}", raw_path.display());

    if rows.is_empty() {
        log::warn!("No sessions inside the search window, report skipped");
        return Ok(());
    }
    let report_path = sink.write_report(&rows, window.start.month()).await?;
    log::info!("Report written to {}", report_path.display());

    Ok(())
}

fn print_summary(rows: &[ReportRow]) {
    for row in rows {
        let months: Vec<String> = row
            .months
            .iter()
            .map(|b| format!("{}: {}", month_name(b.month), b.joined_days()))
            .collect();
        log::info!(
            "{} | {} | {} dates | {}",
            row.course_name,
            row.instructor_name,
            row.total_dates,
            months.join(", ")
        );
    }
}
