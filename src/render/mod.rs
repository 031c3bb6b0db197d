//! Rendering of extraction results for output.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{summary_to_text, table_to_text, to_text};
