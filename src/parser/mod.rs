//! PDF reading: backend, content-stream interpretation and page selection.

pub mod backend;
mod fragments;
mod options;
mod statement;

pub use backend::{check_pdf_header, is_pdf_bytes, LopdfBackend, PdfBackend};
pub use fragments::interpret;
pub use options::{ErrorMode, PageSelection, ParseOptions};
pub use statement::{PageFragments, StatementParser};
