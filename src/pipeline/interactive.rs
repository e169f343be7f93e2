// src/pipeline/interactive.rs

//! Interactive parameter selection.
//!
//! Prompts for school, course, window length, and start date, fetching
//! the live catalog so the user picks from real entries.

use std::io::Write;

use chrono::{Local, NaiveDate};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::error::Result;
use crate::models::Config;
use crate::pipeline::filter::{MAX_MONTHS, SearchWindow};
use crate::services::CatalogService;
use crate::utils::dates;

/// How many courses to print before truncating the listing.
const MAX_LISTED_COURSES: usize = 20;

/// Parameters gathered from the prompts.
#[derive(Debug)]
pub struct RunParams {
    pub course: String,
    pub months: u32,
    pub start_date: Option<NaiveDate>,
}

/// Prompt for a course query, window length, and start date.
pub async fn select_run_params(
    config: &Config,
    client: &reqwest::Client,
    default_months: u32,
) -> Result<RunParams> {
    let service = CatalogService::new(client, config);
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    // A provisional window just to satisfy the portal's form fields.
    let window = SearchWindow::new(Local::now().date_naive(), default_months)?;
    let form = service.fetch_search_form(&window).await?;

    let schools = service.list_schools().await?;
    let school = if schools.is_empty() {
        None
    } else {
        println!("Available schools:");
        for (i, school) in schools.iter().enumerate() {
            println!("  {}. {}", i + 1, school.display_name);
        }
        let line = prompt(
            &mut input,
            &format!("Select a school (1-{}) or press ENTER for all: ", schools.len()),
        )
        .await?;
        line.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| schools.get(i))
    };

    let courses = match school {
        Some(school) => service.list_courses(&form, school).await.unwrap_or_default(),
        None => service.discover(&form).await.map(|c| c.courses).unwrap_or_default(),
    };

    let course = if courses.is_empty() {
        prompt(&mut input, "Course name: ").await?.trim().to_string()
    } else {
        println!("Available courses:");
        for (i, course) in courses.iter().take(MAX_LISTED_COURSES).enumerate() {
            println!("  {}. {}", i + 1, course.name);
        }
        if courses.len() > MAX_LISTED_COURSES {
            println!("  ... and {} more", courses.len() - MAX_LISTED_COURSES);
        }
        let line = prompt(&mut input, "Select a course (number) or type a name: ").await?;
        let line = line.trim();
        line.parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| courses.get(i))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| line.to_string())
    };

    let months = loop {
        let line = prompt(
            &mut input,
            &format!("Months to search, 1-{MAX_MONTHS} (default {default_months}): "),
        )
        .await?;
        let line = line.trim();
        if line.is_empty() {
            break default_months;
        }
        match line.parse::<u32>() {
            Ok(n) if (1..=MAX_MONTHS).contains(&n) => break n,
            _ => println!("Enter a number between 1 and {MAX_MONTHS}."),
        }
    };

    let start_date = loop {
        let line = prompt(&mut input, "Start date dd/mm/yyyy (ENTER for today): ").await?;
        let line = line.trim();
        if line.is_empty() {
            break None;
        }
        match dates::parse_numeric_date(line) {
            Some(date) => break Some(date),
            None => println!("Invalid date, expected dd/mm/yyyy."),
        }
    };

    Ok(RunParams {
        course,
        months,
        start_date,
    })
}

async fn prompt(input: &mut Lines<BufReader<Stdin>>, message: &str) -> Result<String> {
    print!("{message}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?.unwrap_or_default())
}
