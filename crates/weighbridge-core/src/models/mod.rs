//! Data models for weighbridge tickets and configuration.

pub mod config;
pub mod ticket;

pub use config::WeighbridgeConfig;
pub use ticket::{TicketRecord, WasteCategory};
