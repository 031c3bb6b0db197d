//! Reconstructed table types: rows, cells and column bands.

use serde::{Deserialize, Serialize};

/// Upper bound used for the right edge of the last column band.
pub const PAGE_WIDTH_SENTINEL: f32 = f32::MAX;

/// A table row: one cell per column band, ordered left to right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// Representative baseline of the row (PDF coordinates, larger is higher).
    pub y: f32,

    /// Cells, one per column band, including empty placeholders.
    pub cells: Vec<Cell>,
}

impl Row {
    /// Create a new row.
    pub fn new(y: f32, cells: Vec<Cell>) -> Self {
        Self { y, cells }
    }

    /// Create a row from plain cell texts, indexing cells by position.
    pub fn from_texts<S: AsRef<str>>(y: f32, texts: impl IntoIterator<Item = S>) -> Self {
        let cells = texts
            .into_iter()
            .enumerate()
            .map(|(i, t)| Cell::new(t.as_ref(), i))
            .collect();
        Self { y, cells }
    }

    /// Get the cell at a column index.
    pub fn cell(&self, column_index: usize) -> Option<&Cell> {
        self.cells.get(column_index)
    }

    /// Get the text of the cell at a column index, or "" if absent.
    pub fn cell_text(&self, column_index: usize) -> &str {
        self.cell(column_index).map(|c| c.text.as_str()).unwrap_or("")
    }

    /// Number of cells (equals the band count of the page).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Check if the row has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Check if every cell is empty.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_empty)
    }

    /// Raw text of the row: non-empty cells joined with single spaces.
    pub fn text(&self) -> String {
        self.cells
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A table cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell text; fragments that landed in the same band are space-joined.
    pub text: String,

    /// Index of the column band this cell belongs to.
    pub column_index: usize,
}

impl Cell {
    /// Create a new cell.
    pub fn new(text: impl Into<String>, column_index: usize) -> Self {
        Self {
            text: text.into(),
            column_index,
        }
    }

    /// Create an empty placeholder cell.
    pub fn empty(column_index: usize) -> Self {
        Self::new(String::new(), column_index)
    }

    /// Check if the cell has no visible text.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Inferred meaning of a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    #[default]
    Unknown,
    Date,
    Narrative,
    Debit,
    Credit,
    Balance,
}

/// A horizontal x-range inferred to hold one table column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnBand {
    /// Column index (0 = leftmost)
    pub index: usize,
    /// Left boundary (start of the x cluster)
    pub min_x: f32,
    /// Right boundary (start of the next band, or the page-width sentinel)
    pub max_x: f32,
    /// Role assigned by the column role detector
    pub role: ColumnRole,
}

impl ColumnBand {
    /// Create a band with an unknown role.
    pub fn new(index: usize, min_x: f32, max_x: f32) -> Self {
        Self {
            index,
            min_x,
            max_x,
            role: ColumnRole::Unknown,
        }
    }

    /// Check if an x coordinate falls inside the band's nominal range.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x < self.max_x
    }

    /// Check if this is the rightmost band.
    pub fn is_last(&self) -> bool {
        self.max_x == PAGE_WIDTH_SENTINEL
    }
}
