//! Error types for the scraper core.

use chrono::NaiveDateTime;

/// Errors raised while compiling templates or constructing time ranges.
///
/// Every variant is a configuration problem surfaced at startup; a URL
/// that merely fails to match a compiled pattern is not an error and is
/// reported as `None` by the matching APIs.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
    #[error("Unknown date directive %{directive} in template: {template}")]
    UnknownDirective { directive: char, template: String },

    #[error("Template has no date directive: {template}")]
    NoDateDirective { template: String },

    #[error("Malformed extractor field {{{field}}} in template: {template}")]
    MalformedExtractor { field: String, template: String },

    #[error("Invalid time range: start {start} is after end {end}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Invalid regex in template: {0}")]
    Regex(String),
}

impl From<regex::Error> for ScrapeError {
    fn from(e: regex::Error) -> Self {
        ScrapeError::Regex(e.to_string())
    }
}

/// Convenience result type.
pub type ScrapeResult<T> = Result<T, ScrapeError>;
