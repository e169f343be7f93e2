// src/error.rs

//! Unified error handling for the scraper application.

use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (unreachable host, timeout, or non-2xx status)
    #[error("network error for {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writing failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Expected structural element missing from a portal page
    #[error("parse error: {0}")]
    Parse(String),

    /// Course query matched nothing in the catalog
    #[error("no course matching '{query}'")]
    NoMatch { query: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a network error tagged with the failing URL.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a no-match error.
    pub fn no_match(query: impl Into<String>) -> Self {
        Self::NoMatch {
            query: query.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
