//! Air date parsing for the formats catalog sites print.
//!
//! Formats are tried in a fixed order and the first whose shape matches
//! wins. Placeholders (`-`, `?`, `...`, empty) mean "unknown" and are not
//! errors; anything else that matches no format is `UnknownFormat`.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Result, ScrapeError};
use crate::models::record::EndDate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// `2024-04-06`
    IsoDate,
    /// `2024-04`
    IsoMonth,
    /// `Apr 6, 2024`
    MonthDayYear,
    /// `Apr 2024`
    MonthYear,
    /// `04-06-24`, with `?` standing in for unknown digits
    NumericPlaceholder,
    /// `2024`
    Year,
}

impl DateFormat {
    pub const PRIORITY: [Self; 6] = [
        Self::IsoDate,
        Self::IsoMonth,
        Self::MonthDayYear,
        Self::MonthYear,
        Self::NumericPlaceholder,
        Self::Year,
    ];

    fn shape(self) -> &'static Regex {
        static SHAPES: OnceLock<Vec<Regex>> = OnceLock::new();
        let shapes = SHAPES.get_or_init(|| {
            [
                r"^\d{4}-\d{1,2}-\d{1,2}$",
                r"^\d{4}-\d{1,2}$",
                r"^[A-Za-z]{3,9}\.? +\d{1,2}, *\d{4}$",
                r"^[A-Za-z]{3,9}\.? +\d{4}$",
                r"^[\d?]{2}-[\d?]{2}-[\d?]{2}$",
                r"^\d{4}$",
            ]
            .iter()
            .map(|p| Regex::new(p).expect("Invalid regex pattern defined in code"))
            .collect()
        });
        &shapes[self as usize]
    }

    fn parse(self, s: &str) -> Option<NaiveDate> {
        match self {
            Self::IsoDate => NaiveDate::parse_from_str(s, "%Y-%m-%d").ok(),
            Self::IsoMonth => NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d").ok(),
            Self::MonthDayYear => {
                let s = s.replace('.', "");
                NaiveDate::parse_from_str(&s, "%B %d, %Y").ok()
            }
            Self::MonthYear => {
                let s = s.replace('.', "");
                NaiveDate::parse_from_str(&format!("1 {s}"), "%d %B %Y").ok()
            }
            Self::NumericPlaceholder => {
                NaiveDate::parse_from_str(&s.replace("??", "01"), "%m-%d-%y").ok()
            }
            Self::Year => s.parse().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)),
        }
    }
}

fn is_placeholder(s: &str) -> bool {
    matches!(s, "" | "-" | "?" | "..." | "Not available")
}

/// Parses one date. `Ok(None)` for placeholders that mean "unknown".
pub fn parse_date(raw: &str) -> Result<Option<NaiveDate>> {
    let s = raw.trim();
    if is_placeholder(s) {
        return Ok(None);
    }

    for format in DateFormat::PRIORITY {
        if format.shape().is_match(s) {
            return format
                .parse(s)
                .map(Some)
                .ok_or_else(|| ScrapeError::unknown_format("date", s));
        }
    }

    Err(ScrapeError::unknown_format("date", s))
}

/// Splits `"<start> to <end>"` and parses both halves.
///
/// An end of `...` or `?` means still airing. A string without ` to ` is a
/// start date only and leaves the end unknown.
pub fn parse_date_range(raw: &str) -> Result<(Option<NaiveDate>, EndDate)> {
    let Some((start, end)) = raw.split_once(" to ") else {
        return Ok((parse_date(raw)?, EndDate::Unknown));
    };

    let start = parse_date(start)?;
    let end = match end.trim() {
        "..." | "?" => EndDate::Ongoing,
        other => parse_date(other)?.into(),
    };

    Ok((start, end))
}
