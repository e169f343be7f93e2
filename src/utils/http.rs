// src/utils/http.rs

//! HTTP client utilities.
//!
//! One request in flight at a time; callers insert the courtesy delay.

use std::time::Duration;

use reqwest::Client;
use scraper::Html;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured HTTP client.
///
/// The cookie store is required: the portal ties the hierarchy requests
/// and the calendar requests to one server-side session.
pub fn create_client(config: &HttpConfig) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .cookie_store(true)
        .build()
        .map_err(|e| AppError::config(format!("failed to build HTTP client: {e}")))
}

/// Fetch a page with GET and parse it as HTML.
pub async fn fetch_page(client: &Client, url: &str) -> Result<Html> {
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::network(url, e))?;
    let text = response.text().await.map_err(|e| AppError::network(url, e))?;
    Ok(Html::parse_document(&text))
}

/// Submit form parameters with POST and parse the response as HTML.
pub async fn post_form(client: &Client, url: &str, params: &[(String, String)]) -> Result<Html> {
    let response = client
        .post(url)
        .form(params)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::network(url, e))?;
    let text = response.text().await.map_err(|e| AppError::network(url, e))?;
    Ok(Html::parse_document(&text))
}
