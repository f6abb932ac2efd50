//! Regex patterns for weighbridge ticket extraction.
//!
//! Each field has a primary pattern and, where one exists, a fallback that
//! is only consulted when the primary finds nothing. Digits are ASCII only.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Ticket number: 4-digit decoration, series letter, 9-digit serial.
    pub static ref TICKET_NUMBER: Regex = Regex::new(
        r"([0-9]{4})[\s\-]?([PpBbRr])[\s\-]?([0-9]{9})"
    ).unwrap();

    // Looser separators, anchored after the "Ticket No" label.
    pub static ref TICKET_NUMBER_LABELED: Regex = Regex::new(
        r"(?i)Ticket\s*No\.?[:\s]*([0-9]{4})[\s\-.:]*([PBR])[\s\-.:]*([0-9]{9})"
    ).unwrap();

    // Dates as "05-Jan-2025" or "5 Jan 2025"
    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)Date[:\s]*([0-9]{1,2})[\s\-]([A-Za-z]{3})[\s\-]([0-9]{4})"
    ).unwrap();

    // Without the label only the years in service are trusted.
    pub static ref DATE_UNLABELED: Regex = Regex::new(
        r"([0-9]{1,2})[\s\-]([A-Za-z]{3})[\s\-](202[45])"
    ).unwrap();

    // Weights: label, up to 20 characters of noise, then the first digit run.
    pub static ref GROSS_WEIGHT: Regex = Regex::new(
        r"(?i)GROSS[^0-9]{0,20}([0-9]{3,5})"
    ).unwrap();

    pub static ref TARE_WEIGHT: Regex = Regex::new(
        r"(?i)TARE[^0-9]{0,20}([0-9]{3,5})"
    ).unwrap();

    pub static ref NET_WEIGHT: Regex = Regex::new(
        r"(?i)NET[^0-9]{0,20}([0-9]{2,5})"
    ).unwrap();
}
