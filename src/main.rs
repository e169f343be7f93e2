// src/main.rs

//! Esse3 exam report CLI.
//!
//! Scrapes an Esse3 portal for the exam sessions of one course and
//! writes a raw record file plus a per-instructor monthly report.

use clap::Parser;

use esse3_report::error::{AppError, Result};
use esse3_report::export::CsvSink;
use esse3_report::models::Config;
use esse3_report::pipeline::{self, SearchWindow};
use esse3_report::services::CatalogService;
use esse3_report::utils::{dates, http};

/// Esse3 exam date report scraper
#[derive(Parser, Debug)]
#[command(
    name = "esse3-report",
    version,
    about = "Exam date reports from an Esse3 portal"
)]
struct Cli {
    /// Course name to search for (partial names allowed)
    #[arg(short, long, default_value = "cybersecurity")]
    course: String,

    /// Forward search window in months (1-12)
    #[arg(short, long, default_value_t = 6)]
    months: u32,

    /// Window start date as dd/mm/yyyy (default: today)
    #[arg(short, long)]
    start_date: Option<String>,

    /// List the portal's schools and exit
    #[arg(long)]
    list_departments: bool,

    /// List discovered courses per school and exit
    #[arg(long)]
    list_courses: bool,

    /// Dump the search page structure (selects, forms, hidden inputs) as JSON
    #[arg(long)]
    debug_page: bool,

    /// Pick school, course, and window interactively
    #[arg(short, long)]
    interactive: bool,

    /// Basename for the output files (default: esami_<course>)
    #[arg(short, long)]
    output: Option<String>,

    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    config.validate()?;

    // Window parameters are checked before anything touches the network.
    let start = match &cli.start_date {
        Some(text) => dates::parse_numeric_date(text).ok_or_else(|| {
            AppError::config(format!("invalid start date '{text}', expected dd/mm/yyyy"))
        })?,
        None => chrono::Local::now().date_naive(),
    };
    let window = SearchWindow::new(start, cli.months)?;

    let client = http::create_client(&config.http)?;

    if cli.list_departments {
        return list_departments(&config, &client).await;
    }
    if cli.list_courses {
        return list_courses(&config, &client, &window).await;
    }
    if cli.debug_page {
        return debug_page(&config, &client).await;
    }

    let (query, window) = if cli.interactive {
        let params = pipeline::select_run_params(&config, &client, cli.months).await?;
        let start = params.start_date.unwrap_or(start);
        (params.course, SearchWindow::new(start, params.months)?)
    } else {
        (cli.course.clone(), window)
    };

    let basename = cli
        .output
        .clone()
        .unwrap_or_else(|| format!("esami_{}", query.to_lowercase().replace(' ', "_")));
    let sink = CsvSink::new(".", basename);

    pipeline::run_report(&config, &client, &sink, &query, &window).await
}

/// Print the portal's schools.
async fn list_departments(config: &Config, client: &reqwest::Client) -> Result<()> {
    let service = CatalogService::new(client, config);
    let schools = service.list_schools().await?;

    if schools.is_empty() {
        log::warn!("No schools found on the portal");
        return Ok(());
    }
    println!("Schools ({}):", schools.len());
    for (i, school) in schools.iter().enumerate() {
        println!("  {:2}. [{}] {}", i + 1, school.id, school.display_name);
    }
    Ok(())
}

/// Print the discovered courses grouped by school.
async fn list_courses(
    config: &Config,
    client: &reqwest::Client,
    window: &SearchWindow,
) -> Result<()> {
    let service = CatalogService::new(client, config);
    let form = service.fetch_search_form(window).await?;
    let catalog = service.discover(&form).await?;

    if catalog.courses.is_empty() {
        log::warn!("No courses discovered");
        return Ok(());
    }
    for school in &catalog.schools {
        let courses: Vec<_> = catalog.courses_of(&school.id).collect();
        if courses.is_empty() {
            continue;
        }
        println!("{} ({} courses):", school.display_name, courses.len());
        for course in courses {
            println!("  - {}", course.name);
        }
    }
    Ok(())
}

/// Dump the search page structure for markup-drift debugging.
async fn debug_page(config: &Config, client: &reqwest::Client) -> Result<()> {
    let service = CatalogService::new(client, config);
    let structure = service.inspect_page().await?;
    println!("{}", serde_json::to_string_pretty(&structure)?);
    Ok(())
}
