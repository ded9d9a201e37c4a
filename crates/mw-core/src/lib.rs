//! Shared record model, configuration and error types for markweave.

pub mod config;
pub mod error;
pub mod record;

pub use config::{DedupConfig, GraphConfig, LayoutConfig, MarkweaveConfig};
pub use error::{MwError, Result};
pub use record::{load_records, Record};
