//! Error taxonomy for fetching and extraction.
//!
//! None of these are fatal during a scrape: a failed page shortens a listing,
//! a failed field leaves that field at its default. Callers log and move on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Fetch failed for {host}{path}: {reason}")]
    Fetch {
        host: String,
        path: String,
        reason: String,
    },

    #[error("Empty response body from {host}{path}")]
    EmptyBody { host: String, path: String },

    #[error("Could not parse field '{field}': {reason}")]
    FieldParse { field: &'static str, reason: String },

    #[error("Unrecognized {what} format: '{value}'")]
    UnknownFormat { what: &'static str, value: String },

    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ScrapeError {
    pub fn field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::FieldParse {
            field,
            reason: reason.into(),
        }
    }

    pub fn unknown_format(what: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownFormat {
            what,
            value: value.into(),
        }
    }

    /// Page-level failures are worth a warning, field-level ones only a
    /// debug line.
    #[must_use]
    pub const fn is_page_level(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::EmptyBody { .. } | Self::InvalidUrl { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
