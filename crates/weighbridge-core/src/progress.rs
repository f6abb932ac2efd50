//! Progress events and the streamed status protocol.
//!
//! Each event serializes to one JSON object. On the wire an event is framed
//! as a single `data: <json>` line followed by a blank line.

use serde::{Deserialize, Serialize};

/// A status update emitted while a batch is processed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgressEvent {
    /// One page has been processed.
    Processing { page: usize, total: usize, found: usize },
    /// Terminal failure.
    Error { message: String },
    /// Terminal success; `filename` retrieves the report.
    Complete { tickets: usize, filename: String },
}

impl ProgressEvent {
    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Processing { .. })
    }

    /// JSON payload of the event.
    pub fn to_json(&self) -> String {
        // Serializing a plain enum of strings and integers cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Event framed for a `text/event-stream` body.
    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_json())
    }
}

/// Receiver of progress events, invoked synchronously in emission order.
pub trait ProgressSink {
    /// Deliver one event.
    fn emit(&mut self, event: ProgressEvent);
}

impl<F: FnMut(ProgressEvent)> ProgressSink for F {
    fn emit(&mut self, event: ProgressEvent) {
        (self)(event)
    }
}
