//! Rule-based field extractors for weighbridge tickets.

pub mod category;
pub mod dates;
pub mod patterns;
pub mod ticket_number;
pub mod weights;

pub use category::{classify, CategoryExtractor};
pub use dates::{parse_month_abbrev, DateExtractor};
pub use patterns::*;
pub use ticket_number::{canonicalize_ticket_number, TicketNumberExtractor};
pub use weights::{extract_weights, Weights, WeightExtractor};

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;
}

/// Normalize common OCR misreads before any field is matched.
///
/// Pipes are read as `I`; backticks and apostrophes are dropped because
/// they appear as stray marks inside ticket-number glyphs.
pub fn normalize_text(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '`' && *c != '\'')
        .map(|c| if c == '|' { 'I' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("T|cket N'o: 2024-`P123"), "TIcket No: 2024-P123");
        assert_eq!(normalize_text("plain"), "plain");
    }
}
