//! Weighbridge ticket data model.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionError;

/// A single weighbridge transaction read from one scanned page.
///
/// Records are immutable once built; [`TicketRecord::new`] is the only way
/// to obtain one and it enforces the weight invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    ticket_no: String,
    date: NaiveDate,
    gross: u32,
    tare: u32,
    net: u32,
    #[serde(rename = "type")]
    category: WasteCategory,
}

impl TicketRecord {
    /// Build a record, rejecting weights that cannot belong to one weighing.
    ///
    /// Requires `net <= gross`, `tare <= gross` and `net > 0`.
    pub fn new(
        ticket_no: impl Into<String>,
        date: NaiveDate,
        gross: u32,
        tare: u32,
        net: u32,
        category: WasteCategory,
    ) -> Result<Self, ExtractionError> {
        if net > gross {
            return Err(ExtractionError::Validation {
                field: "net",
                reason: format!("net {} exceeds gross {}", net, gross),
            });
        }
        if tare > gross {
            return Err(ExtractionError::Validation {
                field: "tare",
                reason: format!("tare {} exceeds gross {}", tare, gross),
            });
        }
        if net == 0 {
            return Err(ExtractionError::Validation {
                field: "net",
                reason: "net weight must be positive".to_string(),
            });
        }

        Ok(Self {
            ticket_no: ticket_no.into(),
            date,
            gross,
            tare,
            net,
            category,
        })
    }

    /// Canonical ticket number (`P` followed by the 9-digit serial).
    pub fn ticket_no(&self) -> &str {
        &self.ticket_no
    }

    /// Weighing date.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Full English weekday name of the weighing date.
    pub fn day_name(&self) -> String {
        self.date.format("%A").to_string()
    }

    /// Loaded vehicle weight in kilograms.
    pub fn gross(&self) -> u32 {
        self.gross
    }

    /// Empty vehicle weight in kilograms.
    pub fn tare(&self) -> u32 {
        self.tare
    }

    /// Material weight in kilograms.
    pub fn net(&self) -> u32 {
        self.net
    }

    /// Waste category inferred from the page text.
    pub fn category(&self) -> WasteCategory {
        self.category
    }
}

/// Closed set of waste categories a ticket can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WasteCategory {
    #[serde(rename = "Street/Litter")]
    StreetLitter,
    #[serde(rename = "Compost")]
    Compost,
    #[default]
    #[serde(rename = "Flytip")]
    Flytip,
}

impl WasteCategory {
    /// Label used in the report's `Type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StreetLitter => "Street/Litter",
            Self::Compost => "Compost",
            Self::Flytip => "Flytip",
        }
    }
}

impl fmt::Display for WasteCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
