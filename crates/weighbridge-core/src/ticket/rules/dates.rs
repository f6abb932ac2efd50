//! Date extraction for weighbridge tickets.

use chrono::NaiveDate;
use regex::Captures;

use super::patterns::{DATE_LABELED, DATE_UNLABELED};
use crate::error::ExtractionError;

/// Date field extractor.
///
/// Unlike the other field extractors this one distinguishes "no date text"
/// from "date text that is not a calendar date", since the labeled match is
/// authoritative: an invalid labeled date does not fall back to the
/// unlabeled pattern.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Locate and parse the ticket date.
    pub fn extract(&self, text: &str) -> Result<NaiveDate, ExtractionError> {
        let caps = DATE_LABELED
            .captures(text)
            .or_else(|| DATE_UNLABELED.captures(text))
            .ok_or(ExtractionError::MissingField("date"))?;

        parse_date_parts(&caps).ok_or_else(|| ExtractionError::Validation {
            field: "date",
            reason: format!("'{}' is not a valid date", &caps[0]),
        })
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_date_parts(caps: &Captures<'_>) -> Option<NaiveDate> {
    let day: u32 = caps[1].parse().ok()?;
    let month = parse_month_abbrev(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;

    if year < 1 {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an English three-letter month abbreviation, ignoring case.
pub fn parse_month_abbrev(month: &str) -> Option<u32> {
    let number = match month.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(number)
}
