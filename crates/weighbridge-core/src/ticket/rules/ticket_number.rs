//! Ticket number extraction and canonicalization.

use regex::Captures;

use super::patterns::{TICKET_NUMBER, TICKET_NUMBER_LABELED};
use super::FieldExtractor;

/// Ticket number extractor.
pub struct TicketNumberExtractor;

impl TicketNumberExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TicketNumberExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TicketNumberExtractor {
    type Output = String;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        let caps = TICKET_NUMBER
            .captures(text)
            .or_else(|| TICKET_NUMBER_LABELED.captures(text))?;

        canonicalize_ticket_number(&joined_groups(&caps))
    }
}

fn joined_groups(caps: &Captures<'_>) -> String {
    format!("{}{}{}", &caps[1], &caps[2], &caps[3])
}

/// Canonicalize a raw ticket number reading.
///
/// Separators are stripped, the series letter is upper-cased and `B`/`R`
/// (alternate readings of the same glyph) become `P`. The leading 4-digit
/// group is dropped, leaving `P` plus the 9-digit serial. Already canonical
/// input is returned unchanged.
pub fn canonicalize_ticket_number(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '.' | ':'))
        .map(|c| match c.to_ascii_uppercase() {
            'B' | 'R' => 'P',
            other => other,
        })
        .collect();

    if !cleaned.is_ascii() {
        return None;
    }

    let identifier = match cleaned.len() {
        14 if cleaned[..4].bytes().all(|b| b.is_ascii_digit()) => &cleaned[4..],
        10 => cleaned.as_str(),
        _ => return None,
    };

    let (series, serial) = identifier.split_at(1);
    if series != "P" || !serial.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(identifier.to_string())
}
