//! Batch aggregation of tickets across the pages of one document.

use std::collections::HashSet;
use std::time::Instant;

use image::DynamicImage;
use tracing::{debug, info, warn};

use crate::error::{Result, WeighbridgeError};
use crate::models::ticket::TicketRecord;
use crate::ocr::{ImagePreprocessor, OcrEngine};
use crate::progress::{ProgressEvent, ProgressSink};
use crate::ticket::{TicketExtractor, TicketParser};

/// Tickets collected from one request, in page order until sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketBatch {
    records: Vec<TicketRecord>,
}

impl TicketBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record in arrival order.
    pub fn push(&mut self, record: TicketRecord) {
        self.records.push(record);
    }

    /// Number of records collected.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no page produced a record.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in their current order.
    pub fn records(&self) -> &[TicketRecord] {
        &self.records
    }

    /// Stable sort by date; records sharing a date keep arrival order.
    pub fn sort_by_date(&mut self) {
        self.records.sort_by_key(|r| r.date());
    }

    /// Ticket numbers that occur on more than one page.
    pub fn duplicate_ticket_numbers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for record in &self.records {
            let ticket_no = record.ticket_no();
            if !seen.insert(ticket_no) && !duplicates.contains(&ticket_no) {
                duplicates.push(ticket_no);
            }
        }
        duplicates
    }

    /// Consume the batch, yielding its records.
    pub fn into_records(self) -> Vec<TicketRecord> {
        self.records
    }
}

impl FromIterator<TicketRecord> for TicketBatch {
    fn from_iter<I: IntoIterator<Item = TicketRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

/// Runs pages through preprocessing, OCR and extraction one at a time.
pub struct BatchAggregator<'a> {
    ocr: &'a dyn OcrEngine,
    preprocessor: ImagePreprocessor,
    parser: TicketParser,
}

impl<'a> BatchAggregator<'a> {
    /// Create an aggregator recognizing pages with the given engine.
    pub fn new(ocr: &'a dyn OcrEngine) -> Self {
        Self {
            ocr,
            preprocessor: ImagePreprocessor::new(),
            parser: TicketParser::new(),
        }
    }

    /// Process pages in document order and return the date-sorted batch.
    ///
    /// A `processing` event is emitted after every page, whether or not it
    /// yielded a ticket. Fails with [`WeighbridgeError::NoTickets`] when no
    /// page did; any preprocessing or OCR failure aborts the batch.
    pub fn run(&self, pages: &[DynamicImage], sink: &mut dyn ProgressSink) -> Result<TicketBatch> {
        let start = Instant::now();
        let total = pages.len();
        let mut batch = TicketBatch::new();

        for (index, page) in pages.iter().enumerate() {
            let binary = self.preprocessor.process(page)?;
            let text = self.ocr.recognize(&binary)?;

            match self.parser.extract(&text) {
                Some(record) => batch.push(record),
                None => debug!("Page {}/{} yielded no ticket", index + 1, total),
            }

            sink.emit(ProgressEvent::Processing {
                page: index + 1,
                total,
                found: batch.len(),
            });
        }

        if batch.is_empty() {
            warn!("No tickets found in {} pages", total);
            return Err(WeighbridgeError::NoTickets);
        }

        for ticket_no in batch.duplicate_ticket_numbers() {
            warn!("Ticket {} appears on more than one page", ticket_no);
        }

        batch.sort_by_date();
        info!(
            "Collected {} tickets from {} pages in {}ms",
            batch.len(),
            total,
            start.elapsed().as_millis()
        );
        Ok(batch)
    }
}
