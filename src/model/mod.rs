//! Data model shared by the geometry, extraction and rendering stages.
//!
//! Fragments come out of the PDF layer, rows/cells/bands are the
//! reconstructed table, and transaction records are the engine's output.

mod fragment;
mod table;
mod transaction;

pub use fragment::{joined_text, TextFragment};
pub use table::{Cell, ColumnBand, ColumnRole, Row, PAGE_WIDTH_SENTINEL};
pub use transaction::{find_date, is_date_shaped, parse_statement_date, Tier, TransactionRecord};
pub(crate) use transaction::DATE_PATTERN;
