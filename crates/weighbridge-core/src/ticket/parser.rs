//! Rule-based ticket parser.

use tracing::debug;

use crate::error::ExtractionError;
use crate::models::ticket::TicketRecord;

use super::rules::{
    classify, extract_weights, normalize_text, DateExtractor, FieldExtractor,
    TicketNumberExtractor,
};
use super::TicketExtractor;

/// Parses noisy OCR text into a [`TicketRecord`].
///
/// Fields are matched in a fixed order (ticket number, date, weights) and
/// the first missing or invalid field ends the attempt.
pub struct TicketParser {
    ticket_numbers: TicketNumberExtractor,
    dates: DateExtractor,
}

impl TicketParser {
    /// Create a new parser.
    pub fn new() -> Self {
        Self {
            ticket_numbers: TicketNumberExtractor::new(),
            dates: DateExtractor::new(),
        }
    }

    /// Parse a page, reporting why no ticket could be built.
    pub fn parse(&self, text: &str) -> Result<TicketRecord, ExtractionError> {
        let text = normalize_text(text);

        let ticket_no = self
            .ticket_numbers
            .extract(&text)
            .ok_or(ExtractionError::MissingField("ticket number"))?;

        let date = self.dates.extract(&text)?;
        let weights = extract_weights(&text)?;
        let category = classify(&text);

        TicketRecord::new(
            ticket_no,
            date,
            weights.gross,
            weights.tare,
            weights.net,
            category,
        )
    }
}

impl Default for TicketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TicketExtractor for TicketParser {
    fn extract(&self, text: &str) -> Option<TicketRecord> {
        match self.parse(text) {
            Ok(record) => {
                debug!(
                    "Extracted ticket {} dated {} ({} kg net)",
                    record.ticket_no(),
                    record.date(),
                    record.net()
                );
                Some(record)
            }
            Err(reason) => {
                debug!("No ticket on page: {}", reason);
                None
            }
        }
    }
}
