//! Ticket field extraction module.

mod parser;
pub mod rules;

pub use parser::TicketParser;

use crate::models::ticket::TicketRecord;

/// Trait for turning one page of OCR text into a ticket.
pub trait TicketExtractor {
    /// Extract a ticket, or `None` when the page does not hold a complete,
    /// consistent one. Never fails on malformed input.
    fn extract(&self, text: &str) -> Option<TicketRecord>;
}
